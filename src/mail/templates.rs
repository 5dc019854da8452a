//! HTML bodies for transactional mail.

use crate::mail::Mail;

const BRAND: &str = "coursebay";

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: Arial, sans-serif; color: #161d29; max-width: 600px; margin: 0 auto; padding: 20px;">
<div style="font-size: 20px; font-weight: bold; margin-bottom: 20px;">{title}</div>
{body}
<div style="font-size: 13px; color: #999; margin-top: 24px;">Questions? Reply to this mail and the {BRAND} team will get back to you.</div>
</body>
</html>"#,
        title = escape(title),
    )
}

pub fn course_enrollment(to: &str, course_name: &str, student_name: &str) -> Mail {
    let body = format!(
        "<p>Dear {},</p><p>You have successfully registered for the course <b>\"{}\"</b>. \
         Log in to your dashboard to start learning.</p>",
        escape(student_name),
        escape(course_name),
    );
    Mail::new(
        to,
        format!("Successfully Enrolled into {course_name}"),
        layout("Course Registration Confirmation", &body),
    )
}

/// `amount` is in currency sub-units, as the gateway reports it.
pub fn payment_success(
    to: &str,
    student_name: &str,
    amount: i64,
    currency: &str,
    order_id: &str,
    payment_id: &str,
) -> Mail {
    let sign = if amount < 0 { "-" } else { "" };
    let amount = amount.unsigned_abs();
    let body = format!(
        "<p>Dear {},</p><p>We have received a payment of <b>{} {}{}.{:02}</b>.</p>\
         <p>Order ID: {}<br>Payment ID: {}</p>",
        escape(student_name),
        escape(currency),
        sign,
        amount / 100,
        amount % 100,
        escape(order_id),
        escape(payment_id),
    );
    Mail::new(to, "Payment Received", layout("Payment Confirmation", &body))
}

pub fn password_reset(to: &str, url: &str) -> Mail {
    let body = format!(
        "<p>A password reset was requested for this account.</p>\
         <p><a href=\"{url}\">Click to reset your password</a>. The link expires in 5 minutes.</p>\
         <p>If you did not request this, ignore this mail.</p>",
        url = escape(url),
    );
    Mail::new(to, "Password Reset Link", layout("Password Reset", &body))
}

pub fn password_updated(to: &str, name: &str) -> Mail {
    let body = format!(
        "<p>Hey {},</p><p>Your password has been updated for the account <b>{}</b>.</p>\
         <p>If you did not make this change, reset your password immediately.</p>",
        escape(name),
        escape(to),
    );
    Mail::new(
        to,
        format!("Password updated successfully for {name}"),
        layout("Password Update Confirmation", &body),
    )
}

pub fn contact_confirmation(to: &str, first_name: &str, last_name: &str, message: &str, phone: &str) -> Mail {
    let body = format!(
        "<p>Dear {} {},</p><p>Thank you for contacting us. We have received your message \
         and will respond as soon as possible.</p><p>Your message:</p><blockquote>{}</blockquote>\
         <p>Phone: {}</p>",
        escape(first_name),
        escape(last_name),
        escape(message),
        escape(phone),
    );
    Mail::new(to, "Your Data send successfully", layout("Contact Form Confirmation", &body))
}

pub fn contact_forward(inbox: &str, from: &str, first_name: &str, last_name: &str, message: &str, phone: &str) -> Mail {
    let body = format!(
        "<p>New message from {} {} &lt;{}&gt;</p><blockquote>{}</blockquote><p>Phone: {}</p>",
        escape(first_name),
        escape(last_name),
        escape(from),
        escape(message),
        escape(phone),
    );
    Mail::new(inbox, format!("Contact request from {from}"), layout("Contact Request", &body))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn escape_test() {
        assert_eq!(escape("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }

    #[test]
    fn enrollment_mail_test() {
        let mail = course_enrollment("s@example.com", "Rust <101>", "Ada Lovelace");
        assert_eq!(mail.to, "s@example.com");
        assert_eq!(mail.subject, "Successfully Enrolled into Rust <101>");
        assert!(mail.html.contains("Rust &lt;101&gt;"));
        assert!(mail.html.contains("Ada Lovelace"));
    }

    #[test]
    fn payment_amount_formatting_test() {
        let mail = payment_success("s@example.com", "Ada", 49_950, "INR", "order_1", "pay_1");
        assert!(mail.html.contains("INR 499.50"));
        assert!(mail.html.contains("order_1"));

        let mail = payment_success("s@example.com", "Ada", 5, "USD", "order_2", "pay_2");
        assert!(mail.html.contains("USD 0.05"));

        let mail = payment_success("s@example.com", "Ada", -50, "USD", "order_3", "pay_3");
        assert!(mail.html.contains("USD -0.50"));
    }

    #[test]
    fn reset_link_test() {
        let mail = password_reset("s@example.com", "http://localhost:3000/update-password/abc");
        assert!(mail.html.contains("href=\"http://localhost:3000/update-password/abc\""));
    }
}
