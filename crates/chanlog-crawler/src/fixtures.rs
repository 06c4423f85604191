//! HTML fixtures shaped like channel preview pages.

use std::fmt::Write as _;

pub const CHANNEL_NAME: &str = "Durov's Channel";
pub const CHANNEL_IMAGE: &str = "https://cdn.example/durov.jpg";

pub struct Post {
  pub id:       u64,
  pub datetime: String,
  pub text:     String,
  pub photo:    Option<String>,
}

impl Post {
  pub fn new(id: u64, datetime: &str, text: &str) -> Self {
    Self { id, datetime: datetime.into(), text: text.into(), photo: None }
  }

  pub fn with_photo(mut self, src: &str) -> Self {
    self.photo = Some(src.into());
    self
  }
}

pub fn channel_page(channel: &str, posts: &[Post]) -> String {
  let mut messages = String::new();
  for post in posts {
    let photo = post
      .photo
      .as_deref()
      .map(|src| format!(r#"<i class="tgme_widget_message_user_photo"><img src="{src}"></i>"#))
      .unwrap_or_default();
    let text = if post.text.is_empty() {
      String::new()
    } else {
      format!(
        r#"<div class="tgme_widget_message_text js-message_text" dir="auto">{}</div>"#,
        post.text
      )
    };

    write!(
      messages,
      r#"<div class="tgme_widget_message_wrap js-widget_message_wrap">
  <div class="tgme_widget_message js-widget_message" data-post="{channel}/{id}">
    <div class="tgme_widget_message_user">{photo}</div>
    {text}
    <div class="tgme_widget_message_footer">
      <a class="tgme_widget_message_date" href="https://t.me/{channel}/{id}"><time datetime="{datetime}" class="time">12:00</time></a>
    </div>
  </div>
</div>
"#,
      id = post.id,
      datetime = post.datetime,
    )
    .unwrap();
  }

  format!(
    r#"<!DOCTYPE html>
<html>
<body>
<div class="tgme_channel_info">
  <div class="tgme_channel_info_header">
    <i class="tgme_page_photo_image"><img src="{CHANNEL_IMAGE}"></i>
    <div class="tgme_channel_info_header_title"><span dir="auto">{CHANNEL_NAME}</span></div>
  </div>
</div>
<main class="tgme_main">
<section class="tgme_channel_history js-message_history">
{messages}</section>
</main>
</body>
</html>"#
  )
}

pub fn no_messages_page() -> String {
  format!(
    r#"<!DOCTYPE html>
<html>
<body>
<div class="tgme_channel_info_header">
  <div class="tgme_channel_info_header_title"><span dir="auto">{CHANNEL_NAME}</span></div>
</div>
<main class="tgme_main">
<section class="tgme_channel_history js-message_history">
  <div class="tme_no_messages_found">No messages found</div>
</section>
</main>
</body>
</html>"#
  )
}
