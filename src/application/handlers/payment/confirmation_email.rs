//! Purchase confirmation e-mail.

use crate::domain::order::Order;
use crate::ports::EmailMessage;

pub const PURCHASE_CONFIRMATION_SUBJECT: &str = "Покупка прошла успешно!";

/// Renders the confirmation sent once an order is paid.
pub fn purchase_confirmation(order: &Order) -> EmailMessage {
    let body = format!(
        r#"<h1>{}, спасибо большое за покупку "{}"!</h1>
<br>
<p>Надеемся, материал будет тебе полезен и интересен!</p>
<p>Если у тебя возникнут вопросы или захочется поделиться отзывом, просто ответь на это письмо.</p>"#,
        escape_html(&order.student.name),
        escape_html(&order.offer.name),
    );

    EmailMessage {
        to: order.student.email.clone(),
        subject: PURCHASE_CONFIRMATION_SUBJECT.to_string(),
        body,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
