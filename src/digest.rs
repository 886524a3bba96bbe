use crate::models::JobRecord;

pub const SUBJECT: &str = "GIIN Job Alert: New Job Posts Available!";

const INTRO: &str = "Check out these new job opportunities posted within the last week:";

/// The email assembled once per run from every collected posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
    pub job_count: usize,
}

impl Digest {
    pub fn new(jobs: &[JobRecord]) -> Self {
        Self {
            subject: SUBJECT.to_string(),
            body: render(jobs),
            job_count: jobs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.job_count == 0
    }
}

/// Renders the HTML body, listing jobs in the order given.
pub fn render(jobs: &[JobRecord]) -> String {
    let items = jobs.iter().map(render_job).collect::<Vec<_>>().join("\n");
    format!("<html><body><p>{INTRO}</p>\n<ul>{items}</ul></body></html>")
}

fn render_job(job: &JobRecord) -> String {
    let fields = [
        format!(
            r#"Job Title: <a href="{}">{}</a>"#,
            escape_html(&job.link),
            escape_html(&job.title)
        ),
        format!("Host Organization: {}", escape_html(&job.org)),
        format!("Posted {} days ago.", job.days_ago),
    ];

    let spans = fields
        .iter()
        .map(|field| format!("<span>{field}</span>"))
        .collect::<Vec<_>>()
        .join("\n");

    format!("<li>{spans}</li>")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
