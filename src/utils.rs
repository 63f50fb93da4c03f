use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;

/// `303 See Other`; the browser follows up with a `GET` to `location`
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Debug representation of an error that walks the full `source` chain, so
/// that logs show the root cause and not only the outermost message.
///
/// ```text
/// Failed to deliver the welcome email
///
/// Caused by:
///     error sending request for url (http://127.0.0.1:1234/api/send)
/// ```
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
