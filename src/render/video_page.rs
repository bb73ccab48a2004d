//! Page of a single video

use crate::types::VideoRecord;
use crate::utils::paths::ArchivePaths;
use chrono::{Local, TimeZone};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const INPUT_STYLE: &str = "margin-bottom:20px;margin-right:10px;font-size:110%;padding:5px;";
const PRE_STYLE: &str =
    "white-space: pre-wrap; border:1px solid black;max-width:600px;padding:10px;min-height:50px;";

/// Render `videos/<id>.html`.
///
/// Back/Next only show up while the neighbour is in the same channel, which
/// `display_number` and `count_in_channel` tell.
pub fn render_video_page(video: &VideoRecord, paths: &ArchivePaths, count_in_channel: usize) -> String {
    let youtube_url = video.youtube_url();
    let encoded_file = urlencoding::encode(&video.video_file_name);
    let media_href = format!("../archive/{}/media/{}", video.snapshot_id, encoded_file);
    let media_dir = paths.media_dir(&video.snapshot_id);
    let is_mkv = video.video_file_name.ends_with(".mkv");

    let mut html = String::new();
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<link rel="icon" type="image/x-icon" href="../favicon.ico" sizes="16x16">
<title>{}</title>
<style>
body {{padding:20px;}}
* {{ font-family:Arial; }}
</style>
</head>
<body>
"#,
        text(&video.title)
    ));

    html.push_str(&format!(
        "<input type=\"text\" id=\"youtube_url\" name=\"youtube_url\" size=\"60\" style=\"{}\" value=\"{}\"><br><br>\n",
        INPUT_STYLE,
        attr(&youtube_url)
    ));
    html.push_str(&format!(
        "<a target=\"_blank\" href=\"{0}\">{0}</a><br>\n",
        attr(&youtube_url)
    ));

    if is_mkv {
        // browsers cannot play matroska; link the file and show the thumbnail instead
        let local_url = format!("file://{}/{}", media_dir.display(), encoded_file);
        html.push_str(&format!(
            "<a target=\"_blank\" href=\"{}\"><img style=\"margin:10px;height:500px;\" src=\"../archive/{}/media/thumbnail.{}\"></a><br>\n",
            attr(&local_url),
            attr(&video.snapshot_id),
            attr(video.thumbnail_format())
        ));
    } else {
        html.push_str(&format!(
            "<video src=\"{}\" controls height=\"440px\">Your browser does not support the video tag.</video><br>\n",
            attr(&media_href)
        ));
    }

    html.push_str(&format!(
        "<span style=\"font-size:200%;font-weight:bold;\">{}</span><br><br>\n",
        text(&video.title)
    ));
    html.push_str(&format!("#{}&nbsp;&nbsp;&nbsp;", video.display_number));

    let back_enabled = video.display_number > 1 && !video.previous_id.is_empty();
    let next_enabled =
        (video.display_number as usize) < count_in_channel && !video.next_id.is_empty();
    html.push_str(&nav_button("Back", &video.previous_id, back_enabled));
    html.push_str("&nbsp;&nbsp;&nbsp;");
    html.push_str(&nav_button("Next", &video.next_id, next_enabled));

    html.push_str(&format!(
        "<br><br><a href=\"{}\">Download</a> {:.2} MB ",
        attr(&media_href),
        video.size_mib()
    ));

    let helper = if is_mkv {
        let escaped = escape_for_shell(&video.video_file_name);
        let webm = format!("{}webm", escaped.strip_suffix("mkv").unwrap_or(&escaped));
        format!(
            "cd {} && ffmpeg -i {} -preset slow -crf 18 {}",
            media_dir.display(),
            escaped,
            webm
        )
    } else {
        media_dir.display().to_string()
    };
    html.push_str(&format!(
        "<input type=\"text\" size=\"100\" style=\"{}\" value=\"{}\"><br>",
        INPUT_STYLE,
        attr(&helper)
    ));
    html.push_str("<br><br><br>\n");

    let description = if video.description.is_empty() {
        "No description"
    } else {
        video.description.as_str()
    };
    html.push_str(&format!("<pre style=\"{}\">{}</pre>", PRE_STYLE, text(description)));

    html.push_str("<h2>Comments</h2>");
    for comment in &video.comments {
        let written = Local
            .timestamp_opt(comment.timestamp_seconds, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        html.push_str(&format!(
            "<div style=\"margin-left:{}px;\"><h3>{}</h3>",
            comment.dot_count() * 50,
            text(&comment.author)
        ));
        html.push_str(&format!(
            "<span style=\"color:grey;font-size:80%;\">{}</span><br>\n",
            written
        ));
        html.push_str(&format!(
            "<span style=\"color:grey;font-size:80%;\">{} {}</span><br>\n",
            text(&comment.id),
            text(&comment.parent_id)
        ));
        html.push_str(&format!(
            "<pre style=\"{}\">{}</pre></div>",
            PRE_STYLE,
            text(&comment.text)
        ));
    }

    html.push_str("</body></html>");
    html
}

fn nav_button(label: &str, target_id: &str, enabled: bool) -> String {
    let (disabled, hidden) = if enabled {
        ("", "")
    } else {
        ("disabled", "visibility:hidden;")
    };
    format!(
        "<button {} style=\"{}font-size:200%;\" onclick=\"window.location ='./{}.html'\">{}</button>",
        disabled,
        hidden,
        attr(target_id),
        label
    )
}

/// Backslash-escape characters the shell would interpret
fn escape_for_shell(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, ' ' | '(' | ')' | '#' | '&' | ';' | '|' | '"' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
