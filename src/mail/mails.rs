use std::fs;

use super::sendmail::send_email;

const NOTIFICATION_TEMPLATE: &str = "src/mail/templates/Notification-email.html";

/// One template covers every notification email; the message line is the
/// variable part.
pub async fn send_notification_email(
    to_email: &str,
    username: &str,
    message: &str,
    app_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let html = render_template(
        NOTIFICATION_TEMPLATE,
        &[
            ("{{username}}", username),
            ("{{message}}", message),
            ("{{app_link}}", &format!("{}/notifications", app_url)),
        ],
    )?;

    send_email(to_email, "HanapBuhay Update", &html).await
}

fn render_template(
    path: &str,
    placeholders: &[(&str, &str)],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut html = fs::read_to_string(path).map_err(|e| {
        tracing::error!("Failed to read email template {}: {}", path, e);
        format!("Template not found: {}", path)
    })?;

    for (key, value) in placeholders {
        html = html.replace(key, value);
    }
    Ok(html)
}
