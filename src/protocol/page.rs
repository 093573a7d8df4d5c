//! Index page rendering

use std::fmt::Write;

use crate::registry::StoredFile;

/// Everything the index page shows
#[derive(Debug)]
pub struct IndexView<'a> {
    pub local_ip: &'a str,
    pub port: u16,
    pub files: &'a [StoredFile],
    pub success: Option<&'a str>,
    pub error: Option<&'a str>,
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LAN File Share</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh; display: flex; justify-content: center;
            align-items: center; padding: 20px;
        }
        .container {
            background: white; border-radius: 15px; max-width: 600px; width: 100%;
            padding: 40px; box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3);
        }
        .header { text-align: center; margin-bottom: 40px; }
        .header h1 { color: #333; font-size: 28px; margin-bottom: 10px; }
        .header p, .info-box p { color: #666; font-size: 14px; margin: 5px 0; }
        .info-box {
            background: #f0f4ff; border-left: 4px solid #667eea; padding: 15px;
            border-radius: 5px; margin-bottom: 30px;
        }
        h2 {
            color: #333; font-size: 18px; margin-bottom: 15px;
            border-bottom: 2px solid #667eea; padding-bottom: 10px;
        }
        .upload-section { margin-bottom: 40px; }
        .upload-label {
            display: block; padding: 30px; border: 2px dashed #667eea; border-radius: 10px;
            background: #f9f9f9; text-align: center; color: #667eea; font-weight: bold;
        }
        .upload-btn {
            background: #667eea; color: white; padding: 12px 30px; border: none;
            border-radius: 5px; font-size: 16px; cursor: pointer; width: 100%;
            margin-top: 15px; font-weight: bold;
        }
        .files-list { list-style: none; }
        .file-item {
            background: #f9f9f9; padding: 15px; margin-bottom: 10px; border-radius: 8px;
            display: flex; justify-content: space-between; align-items: center;
            border-left: 4px solid #667eea;
        }
        .file-name { color: #333; font-weight: bold; margin-bottom: 5px; word-break: break-word; }
        .file-meta, .file-count { color: #999; font-size: 12px; }
        .file-actions { display: flex; gap: 10px; margin-left: 10px; }
        .btn-download, .btn-delete {
            color: white; padding: 8px 15px; border: none; border-radius: 5px;
            cursor: pointer; text-decoration: none; font-size: 12px;
        }
        .btn-download { background: #667eea; }
        .btn-delete { background: #ff6b6b; }
        .empty-message { text-align: center; color: #999; padding: 30px; font-size: 14px; }
        .error, .success { padding: 15px; border-radius: 5px; margin-bottom: 20px; }
        .error { background: #ffe0e0; border-left: 4px solid #ff6b6b; color: #c92a2a; }
        .success { background: #e0ffe0; border-left: 4px solid #51cf66; color: #2b8a3e; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>LAN File Share</h1>
            <p>Share files between devices on your WiFi network</p>
        </div>
"#;

const UPLOAD_FORM: &str = r#"        <div class="upload-section">
            <h2>Upload File</h2>
            <form method="POST" action="/upload" enctype="multipart/form-data">
                <label for="file" class="upload-label">Choose file to upload</label>
                <input type="file" id="file" name="file" required>
                <button type="submit" class="upload-btn">Upload File</button>
            </form>
        </div>
"#;

const PAGE_TAIL: &str = r#"    </div>
</body>
</html>
"#;

/// Render the index page
pub fn render_index(view: &IndexView<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(PAGE_HEAD);

    let _ = write!(
        html,
        r#"        <div class="info-box">
            <strong>How to connect:</strong>
            <p>Open your browser and go to: <strong>http://{}:{}</strong></p>
            <p>From any device on the same WiFi network</p>
        </div>
"#,
        escape_html(view.local_ip),
        view.port
    );

    if let Some(error) = view.error {
        let _ = writeln!(html, r#"        <div class="error">{}</div>"#, escape_html(error));
    }
    if let Some(success) = view.success {
        let _ = writeln!(
            html,
            r#"        <div class="success">{}</div>"#,
            escape_html(success)
        );
    }

    html.push_str(UPLOAD_FORM);
    html.push_str("        <div class=\"files-section\">\n            <h2>Shared Files</h2>\n");

    if view.files.is_empty() {
        html.push_str(
            "            <div class=\"empty-message\">No files shared yet. Upload a file to get started!</div>\n",
        );
    } else {
        html.push_str("            <ul class=\"files-list\">\n");
        for file in view.files {
            render_file_item(&mut html, file);
        }
        html.push_str("            </ul>\n");
        let _ = writeln!(
            html,
            r#"            <div class="file-count">Total files: {}</div>"#,
            view.files.len()
        );
    }

    html.push_str("        </div>\n");
    html.push_str(PAGE_TAIL);
    html
}

fn render_file_item(html: &mut String, file: &StoredFile) {
    let name = escape_html(&file.filename);
    let href = escape_html(&urlencoding::encode(&file.filename));

    let _ = write!(
        html,
        r#"                <li class="file-item">
                    <div class="file-info">
                        <div class="file-name">{name}</div>
                        <div class="file-meta">Size: {size} | Uploaded: {date}</div>
                    </div>
                    <div class="file-actions">
                        <a href="/download/{href}" class="btn-download">Download</a>
                        <form method="POST" action="/delete/{href}" style="margin: 0;">
                            <button type="submit" class="btn-delete" onclick="return confirm('Delete this file?')">Delete</button>
                        </form>
                    </div>
                </li>
"#,
        size = file.display_size(),
        date = file.display_date(),
    );
}

/// Escape text for use in HTML content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
