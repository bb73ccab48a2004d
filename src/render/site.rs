//! Index and channel pages
//!
//! `videos.html` lists every channel. `channels/<stem>.html` additionally
//! shows the channel's videos as a grid of cards, and writing it also writes
//! the page of every video on it.

use crate::core::ordering::{ChannelGroup, count_in_channel, group_channels};
use crate::error::Result;
use crate::render::thumbnail::thumbnail_data_uri;
use crate::render::video_page::render_video_page;
use crate::types::{Settings, THUMBNAIL_WIDTH, VideoRecord};
use crate::utils::paths::{ArchivePaths, channel_file_stem, ensure_output_dirs};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use tokio::fs;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<link rel="icon" type="image/x-icon" href="favicon.ico" sizes="16x16">
<title>Youtube videos</title>
<style>
body {padding:20px;}
* { font-family:Arial; }
.videos { }
.box { padding:10px; }
</style>
</head>
<body>
"#;

/// Layout switches taken from [`Settings`]
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Cards per table row; 0 for no fixed width and no row breaks
    pub videos_per_row: u32,
    pub thumbnail_as_base64: bool,
    pub thumbnail_links_to_youtube: bool,
    /// Rewrite video pages that already exist
    pub always_generate_html_files: bool,
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            videos_per_row: settings.videos_per_row,
            thumbnail_as_base64: settings.thumbnail_as_base64,
            thumbnail_links_to_youtube: settings.thumbnail_links_to_youtube,
            always_generate_html_files: settings.always_generate_html_files,
        }
    }
}

/// What a site run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub channel_pages: usize,
    pub video_pages: usize,
}

/// Set `display_number` to the 1-based position of each record in its channel
pub fn assign_display_numbers(records: &mut [VideoRecord], channel_name: &str) {
    let mut number = 0;
    for record in records.iter_mut().filter(|r| r.channel_name == channel_name) {
        number += 1;
        record.display_number = number;
    }
}

/// Render the listing for all channels, or the card grid of one of them.
///
/// `records` must already be numbered for `wanted`.
pub fn render_listing(
    records: &[VideoRecord],
    channels: &[ChannelGroup],
    wanted: Option<&str>,
    paths: &ArchivePaths,
    options: &RenderOptions,
) -> String {
    let mut html = String::from(PAGE_HEAD);
    // channel pages live one level down
    let channel_link_prefix = if wanted.is_some() { "" } else { "channels/" };

    for channel in channels {
        if wanted.is_some_and(|name| name != channel.name) {
            continue;
        }

        html.push_str(&format!("<h1>{}</h1>\n", text(&channel.name)));
        if options.videos_per_row > 0 {
            html.push_str(&format!(
                "<div style=\"max-width:{}px\">",
                (THUMBNAIL_WIDTH + 20) * options.videos_per_row
            ));
        } else {
            html.push_str("<div>");
        }

        let stem = channel_file_stem(&channel.url, &channel.name);
        html.push_str(&format!(
            "<a target=\"_blank\" href=\"{}{}.html\">Videos</a>",
            channel_link_prefix,
            attr(&urlencoding::encode(&stem))
        ));
        html.push_str(&format!(
            "&nbsp;&nbsp;&nbsp;( <a href=\"{0}\">{1}</a> )",
            attr(&channel.url),
            text(&channel.url)
        ));

        if wanted.is_some() {
            html.push_str(&render_cards(records, &channel.name, paths, options));
        }

        html.push_str("</div>");
    }

    html.push_str("</body></html>");
    html
}

fn render_cards(
    records: &[VideoRecord],
    channel_name: &str,
    paths: &ArchivePaths,
    options: &RenderOptions,
) -> String {
    let per_row = options.videos_per_row as usize;
    let mut html = String::from("<div class=\"videos\"><table>\n");
    let mut in_row = 0;

    for record in records.iter().filter(|r| r.channel_name == channel_name) {
        if in_row == 0 {
            html.push_str("<tr>");
        }
        in_row += 1;

        html.push_str(&render_card(record, paths, options));

        if per_row > 0 && in_row == per_row {
            html.push_str("</tr>\n");
            in_row = 0;
        }
    }
    if in_row > 0 {
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n</div>");
    html
}

fn render_card(record: &VideoRecord, paths: &ArchivePaths, options: &RenderOptions) -> String {
    let target = if options.thumbnail_links_to_youtube {
        record.youtube_url()
    } else {
        format!("../videos/{}.html", urlencoding::encode(&record.id))
    };

    let thumbnail_name = format!("mini-thumbnail.{}", record.mini_thumbnail_format());
    let thumbnail = if options.thumbnail_as_base64 {
        thumbnail_data_uri(&paths.media_dir(&record.snapshot_id).join(&thumbnail_name))
    } else {
        format!("../archive/{}/media/{}", record.snapshot_id, thumbnail_name)
    };

    format!(
        "<td><div class=\"box\"><table style=\"margin:5px;max-width:{width}px;\">\n\
         <tr><td><a href=\"{target}\" target=\"_blank\"><img src=\"{thumbnail}\" width=\"{width}\"></a></td></tr>\n\
         <tr><td><b style=\"font-size:90%;\">{title}</b></td></tr>\n\
         <tr><td style=\"font-size:80%;color:grey;\">{date} &bull; {duration} &bull; #{number}</td></tr>\n\
         </table></div></td>\n",
        width = THUMBNAIL_WIDTH,
        target = attr(&target),
        thumbnail = attr(&thumbnail),
        title = text(&record.title),
        date = format_upload_date(&record.upload_date),
        duration = text(&record.duration_text),
        number = record.display_number,
    )
}

/// "20240131" -> "2024-01-31"; anything shorter is shown as is
pub fn format_upload_date(date: &str) -> String {
    match (date.get(0..4), date.get(4..6), date.get(6..8)) {
        (Some(year), Some(month), Some(day)) => {
            text(&format!("{}-{}-{}", year, month, day)).to_string()
        }
        _ => text(date).to_string(),
    }
}

/// Write every channel page, the video pages they link to, and the index.
///
/// Assigns `display_number` on `records`. Any write failure aborts the run.
pub async fn write_site(
    records: &mut [VideoRecord],
    paths: &ArchivePaths,
    options: &RenderOptions,
) -> Result<SiteReport> {
    ensure_output_dirs(paths).await?;

    let channels = group_channels(records);
    let total = records.len();
    let mut report = SiteReport::default();

    for channel in &channels {
        assign_display_numbers(records, &channel.name);
        let html = render_listing(records, &channels, Some(channel.name.as_str()), paths, options);

        let in_channel = count_in_channel(records, &channel.name);
        for record in records.iter().filter(|r| r.channel_name == channel.name) {
            let page = paths.video_page(&record.id);
            if !options.always_generate_html_files && fs::try_exists(&page).await? {
                continue;
            }
            fs::write(&page, render_video_page(record, paths, in_channel)).await?;
            report.video_pages += 1;
            tracing::info!("Processed {} of {}", report.video_pages, total);
        }

        let stem = channel_file_stem(&channel.url, &channel.name);
        fs::write(paths.channel_page(&stem), html).await?;
        report.channel_pages += 1;
    }

    let index = render_listing(records, &channels, None, paths, options);
    fs::write(paths.index_file(), index).await?;

    tracing::info!(
        channels = report.channel_pages,
        videos = report.video_pages,
        "wrote {}",
        paths.index_file().display()
    );
    Ok(report)
}
