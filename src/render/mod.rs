pub mod site;
pub mod thumbnail;
pub mod video_page;
