//! Directory listing generation

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::Path;
use vesta_core::Result;

/// Characters escaped in href attributes beyond controls
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'&')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%');

struct Entry {
    name: String,
    is_dir: bool,
    size: u64,
    modified: Option<std::time::SystemTime>,
}

/// Generate an HTML directory listing, directories first, names escaped.
pub async fn render_listing(dir_path: &Path, request_path: &str) -> Result<String> {
    let mut entries = Vec::new();
    let mut reader = tokio::fs::read_dir(dir_path).await?;

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = entry.metadata().await?;
        entries.push(Entry {
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));

    let title = escape_html(request_path);
    let mut html = format!(
        "<!DOCTYPE html><html><head><title>Index of {}</title></head>\
         <body><h1>Index of {}</h1><hr><pre>",
        title, title
    );

    if request_path != "/" {
        html.push_str("<a href=\"..\">../</a>\n");
    }

    for entry in &entries {
        let display = if entry.is_dir {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let href = utf8_percent_encode(&display, HREF).to_string();
        let size = if entry.is_dir {
            "-".to_string()
        } else {
            format_size(entry.size)
        };
        let modified = entry
            .modified
            .map(httpdate::fmt_http_date)
            .unwrap_or_else(|| "-".to_string());

        html.push_str(&format!(
            "<a href=\"{}\">{:<40}</a> {:>10}  {}\n",
            href,
            escape_html(&display),
            size,
            modified
        ));
    }

    html.push_str("</pre><hr></body></html>");
    Ok(html)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
