// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::PostingNotifier;
use crate::sources::types::CanonicalPosting;

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Build from SMTP_HOST / SMTP_USER / SMTP_PASS / NOTIFY_EMAIL_FROM /
    /// NOTIFY_EMAIL_TO. A missing variable is an error the caller typically
    /// downgrades to "notifications disabled".
    pub fn from_env() -> Result<Self> {
        let host = require_env("SMTP_HOST")?;
        let user = require_env("SMTP_USER")?;
        let pass = require_env("SMTP_PASS")?;
        let from_addr = require_env("NOTIFY_EMAIL_FROM")?;
        let to_addr = require_env("NOTIFY_EMAIL_TO")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }

    fn render_html(postings: &[CanonicalPosting]) -> String {
        let mut rows = String::new();
        for p in postings {
            let esc = |s: &str| html_escape::encode_text(s).to_string();
            rows.push_str(&format!(
                "<tr><td><a href=\"{url}\">{title}</a></td><td>{company}</td><td>{location}</td><td>{date}</td><td>{source}</td></tr>\n",
                url = esc(&p.url),
                title = esc(&p.title),
                company = esc(&p.company),
                location = esc(&p.location),
                date = esc(&p.date_posted),
                source = esc(&p.source),
            ));
        }
        format!(
            "<html><body>\
             <h2>Found {count} new jobs matching your criteria</h2>\
             <table border=\"1\" cellpadding=\"4\">\
             <tr><th>Title</th><th>Company</th><th>Location</th><th>Posted</th><th>Source</th></tr>\
             {rows}</table></body></html>",
            count = postings.len(),
        )
    }
}

#[async_trait::async_trait]
impl PostingNotifier for EmailSender {
    async fn notify(&self, postings: &[CanonicalPosting]) -> Result<()> {
        let subject = format!(
            "New job postings found - {}",
            chrono::Utc::now().format("%Y-%m-%d")
        );
        let body = Self::render_html(postings);

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(body)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} missing"))
}
