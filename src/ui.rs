use crate::errors::ClientError;
use crate::view::{ActivityCard, ActivityListView, LOAD_FAILED_NOTICE, PageView};
use std::fmt::Write as _;
use std::path::Path;

pub fn render_page(page: &PageView) -> String {
    let message_class = if page.message.hidden {
        format!("{} hidden", page.message.kind.css_class())
    } else {
        page.message.kind.css_class().to_string()
    };

    INDEX_HTML
        .replace("{{USER_STATUS}}", &escape(&page.auth.status_text))
        .replace(
            "{{USER_STATUS_CLASS}}",
            if page.auth.logged_in { "logged-in" } else { "" },
        )
        .replace(
            "{{LOGIN_MODAL_CLASS}}",
            if page.login.open { "modal" } else { "modal hidden" },
        )
        .replace("{{LOGIN_USERNAME}}", &escape(&page.login.username))
        .replace(
            "{{LOGIN_MESSAGE}}",
            &escape(page.login.message.as_deref().unwrap_or_default()),
        )
        .replace("{{ACTIVITIES}}", &render_activities(&page.activities))
        .replace("{{OPTIONS}}", &render_options(page))
        .replace("{{SIGNUP_EMAIL}}", &escape(&page.signup.email))
        .replace(
            "{{SUBMIT_DISABLED}}",
            if page.auth.signup_enabled { "" } else { " disabled" },
        )
        .replace(
            "{{NOTICE_CLASS}}",
            if page.auth.teacher_notice_hidden { "hidden" } else { "" },
        )
        .replace("{{MESSAGE_CLASS}}", &message_class)
        .replace("{{MESSAGE}}", &escape(&page.message.text))
}

/// Writes the HTML rendering of `page` to `path`, creating parent directories.
pub async fn save_page(path: &Path, page: &PageView) -> Result<(), ClientError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, render_page(page)).await?;
    Ok(())
}

pub fn render_activities(list: &ActivityListView) -> String {
    match list {
        ActivityListView::Loading => "<p>Loading activities...</p>".to_string(),
        ActivityListView::Failed => format!("<p>{LOAD_FAILED_NOTICE}</p>"),
        ActivityListView::Loaded(cards) => {
            let mut html = String::new();
            for card in cards {
                render_card(&mut html, card);
            }
            html
        }
    }
}

fn render_card(html: &mut String, card: &ActivityCard) {
    let participants = if card.participants.is_empty() {
        "<p><em>No participants yet</em></p>".to_string()
    } else {
        let mut items = String::new();
        for row in &card.participants {
            let delete = match &row.delete {
                Some(control) => format!(
                    r#"<button class="delete-btn" data-activity="{}" data-email="{}">&#10060;</button>"#,
                    escape(&control.activity),
                    escape(&control.email)
                ),
                None => String::new(),
            };
            let _ = write!(
                items,
                r#"<li><span class="participant-email">{}</span>{delete}</li>"#,
                escape(&row.email)
            );
        }
        format!(
            r#"<div class="participants-section"><h5>Participants:</h5><ul class="participants-list">{items}</ul></div>"#
        )
    };

    let _ = write!(
        html,
        r#"<div class="activity-card">
  <h4>{}</h4>
  <p>{}</p>
  <p><strong>Schedule:</strong> {}</p>
  <p><strong>Availability:</strong> {} spots left</p>
  <div class="participants-container">{participants}</div>
</div>
"#,
        escape(&card.name),
        escape(&card.description),
        escape(&card.schedule),
        card.spots_left
    );
}

fn render_options(page: &PageView) -> String {
    let mut html = String::new();
    for (idx, name) in page.activity_options.iter().enumerate() {
        // The first entry is the placeholder and submits an empty value.
        let value = if idx == 0 { "" } else { name.as_str() };
        let selected = if idx > 0 && *name == page.signup.activity {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{}"{selected}>{}</option>"#,
            escape(value),
            escape(name)
        );
    }
    html
}

/// Plain-text rendering for the terminal front-end.
pub fn render_text(page: &PageView) -> String {
    let mut out = String::new();

    if page.auth.logged_in {
        let _ = writeln!(out, "[{}]", page.auth.status_text);
    } else {
        let _ = writeln!(
            out,
            "[not logged in] Only teachers can register students. Type `account` to log in."
        );
    }

    if page.login.open {
        let _ = writeln!(out, "Login: use `login <username> <password>` or `close`");
        if let Some(message) = &page.login.message {
            let _ = writeln!(out, "  ! {message}");
        }
    }

    match &page.activities {
        ActivityListView::Loading => {
            let _ = writeln!(out, "Loading activities...");
        }
        ActivityListView::Failed => {
            let _ = writeln!(out, "{LOAD_FAILED_NOTICE}");
        }
        ActivityListView::Loaded(cards) => {
            for card in cards {
                let _ = writeln!(out);
                let _ = writeln!(out, "== {} ==", card.name);
                let _ = writeln!(out, "{}", card.description);
                let _ = writeln!(out, "Schedule: {}", card.schedule);
                let _ = writeln!(out, "Availability: {} spots left", card.spots_left);
                if card.participants.is_empty() {
                    let _ = writeln!(out, "No participants yet");
                }
                for row in &card.participants {
                    let marker = if row.delete.is_some() { " [x]" } else { "" };
                    let _ = writeln!(out, "  - {}{marker}", row.email);
                }
            }
        }
    }

    if !page.message.hidden {
        let label = page.message.kind.css_class();
        let _ = writeln!(out);
        let _ = writeln!(out, "({label}) {}", page.message.text);
    }

    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mergington High School Activities</title>
  <style>
    body {
      font-family: Arial, sans-serif;
      line-height: 1.6;
      color: #333;
      max-width: 1200px;
      margin: 0 auto;
      padding: 20px;
      background-color: #f5f5f5;
    }

    header {
      text-align: center;
      padding: 20px 0;
      margin-bottom: 30px;
      background-color: #1a237e;
      color: white;
      border-radius: 5px;
      position: relative;
    }

    .user-section {
      position: absolute;
      top: 20px;
      right: 20px;
      display: flex;
      align-items: center;
      gap: 10px;
    }

    #user-status.logged-in {
      font-weight: bold;
    }

    main {
      display: flex;
      flex-wrap: wrap;
      gap: 30px;
      justify-content: center;
    }

    section {
      background-color: white;
      padding: 25px;
      border-radius: 5px;
      box-shadow: 0 2px 5px rgba(0, 0, 0, 0.1);
      width: 100%;
      max-width: 500px;
    }

    .activity-card {
      margin-bottom: 15px;
      padding: 15px;
      border: 1px solid #ddd;
      border-radius: 5px;
      background-color: #f9f9f9;
    }

    .participants-list {
      list-style: none;
      padding-left: 0;
    }

    .delete-btn {
      background: none;
      border: none;
      cursor: pointer;
    }

    .success {
      background-color: #e8f5e9;
      color: #2e7d32;
      border: 1px solid #a5d6a7;
    }

    .error {
      background-color: #ffebee;
      color: #c62828;
      border: 1px solid #ef9a9a;
    }

    .hidden {
      display: none;
    }

    .modal {
      position: fixed;
      inset: 0;
      background-color: rgba(0, 0, 0, 0.5);
      display: flex;
      align-items: center;
      justify-content: center;
    }

    .modal.hidden {
      display: none;
    }
  </style>
</head>
<body>
  <header>
    <h1>Mergington High School</h1>
    <h2>Extracurricular Activities</h2>
    <div class="user-section">
      <span id="user-status" class="{{USER_STATUS_CLASS}}">{{USER_STATUS}}</span>
      <button id="user-icon" title="Teacher login">&#128100;</button>
    </div>
  </header>

  <div id="login-modal" class="{{LOGIN_MODAL_CLASS}}">
    <div class="modal-content">
      <span class="close">&times;</span>
      <h3>Teacher Login</h3>
      <form id="login-form">
        <label for="username">Username:</label>
        <input type="text" id="username" value="{{LOGIN_USERNAME}}" required />
        <label for="password">Password:</label>
        <input type="password" id="password" value="" required />
        <button type="submit">Login</button>
      </form>
      <div id="login-message" class="error">{{LOGIN_MESSAGE}}</div>
    </div>
  </div>

  <main>
    <section id="activities-container">
      <h3>Available Activities</h3>
      <div id="activities-list">{{ACTIVITIES}}</div>
    </section>

    <section id="signup-container">
      <h3>Sign Up for an Activity</h3>
      <p id="teacher-only-notice" class="{{NOTICE_CLASS}}">Only teachers can register students. Please log in.</p>
      <form id="signup-form">
        <label for="email">Student Email:</label>
        <input type="email" id="email" value="{{SIGNUP_EMAIL}}" required />
        <label for="activity">Select Activity:</label>
        <select id="activity" required>{{OPTIONS}}</select>
        <button type="submit"{{SUBMIT_DISABLED}}>Sign Up</button>
      </form>
      <div id="message" class="{{MESSAGE_CLASS}}">{{MESSAGE}}</div>
    </section>
  </main>
</body>
</html>
"#;
