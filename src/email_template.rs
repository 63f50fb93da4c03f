use tera::Context;
use tera::Tera;

const WELCOME_HTML: &str = "welcome.html";
const WELCOME_TEXT: &str = "welcome.txt";

/// Subject line of the welcome email; fixed for every recipient
pub const WELCOME_SUBJECT: &str = "Welcome to Dinnersaurus!";

/// Both bodies of a rendered email
#[derive(Debug)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Compiled email templates. Built once at startup; rendering only reads.
///
/// Templates are embedded at compile time (paths relative to this file), so a
/// missing template file is a build error rather than a runtime one. Tera
/// autoescapes the `.html` template (but not `.txt`), which matters because
/// the placeholder is user input.
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        Self::from_raw(
            include_str!("../templates/welcome.html"),
            include_str!("../templates/welcome.txt"),
        )
    }

    /// Compile arbitrary welcome templates; both receive `display_name`
    pub fn from_raw(
        html: &str,
        text: &str,
    ) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(WELCOME_HTML, html), (WELCOME_TEXT, text)])?;
        Ok(Self { tera })
    }

    /// The placeholder is filled with whatever identifies the recipient; we
    /// only ever know their email address.
    #[tracing::instrument(name = "Rendering welcome email", skip(self))]
    pub fn render_welcome(
        &self,
        display_name: &str,
    ) -> Result<RenderedEmail, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("display_name", display_name);
        Ok(RenderedEmail {
            html: self.tera.render(WELCOME_HTML, &ctx)?,
            text: self.tera.render(WELCOME_TEXT, &ctx)?,
        })
    }
}
