use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;
use actix_web_flash_messages::Level;

/// `GET /`
///
/// The landing page is reduced to the waitlist form. The outcome of the last
/// `POST /waitlist` arrives as a flash message (signed cookie) and is shown
/// once above the form.
pub async fn home(flash_messages: IncomingFlashMessages) -> HttpResponse {
    let mut msg_html = String::new();
    for msg in flash_messages.iter() {
        let class = match msg.level() {
            Level::Error => "error",
            _ => "success",
        };
        // flash content is ours, but escape anyway; it ends up inside html
        msg_html.push_str(&format!(
            "<p class=\"{class}\">{}</p>\n",
            htmlescape::encode_minimal(msg.content())
        ));
    }

    let body = format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta http-equiv="content-type" content="text/html; charset=utf-8" />
    <title>Dinnit</title>
  </head>
  <body>
    <h1>Host a Dinner. Share a Moment. Make Connections.</h1>
    <section id="waitlist">
      <h2>Be the First to Experience Dinnit</h2>
      <!-- disable the button while the submission is outstanding -->
      <form
        action="/waitlist"
        method="post"
        onsubmit="const b = this.querySelector('button'); b.disabled = true; b.textContent = 'Joining...';"
      >
        <input
          type="email"
          name="email"
          placeholder="Enter your email"
          required
          pattern="[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{{2,}}$"
        />
        <button type="submit">Join the Waitlist</button>
      </form>
      {msg_html}
    </section>
  </body>
</html>
"#
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}
