//! Webhook request body and fixed reply texts

use serde::Serialize;

/// Header carrying the system prompt (also duplicated in the body)
pub const SYSTEM_PROMPT_HEADER: &str = "X-System-Prompt";

/// Reply shown when the webhook call fails
pub const WEBHOOK_ERROR_TEXT: &str = "Maaf, terjadi kesalahan saat menghubungkan ke AI Agent.";

/// Reply shown once a visitor is over the ceiling
pub const RATE_LIMIT_TEXT: &str =
    "Batas pesan demo sudah tercapai. Hubungi tim Vlow.AI untuk mencoba lebih lanjut.";

/// Replies used when no webhook is configured
pub const CANNED_RESPONSES: [&str; 5] = [
    "Menarik! Boleh ceritakan lebih detail tentang kebutuhan bisnis kamu?",
    "Tentu, Vlow.AI bisa membantu otomatisasi chat WhatsApp kamu 24/7.",
    "Fitur kami mencakup broadcast, auto-reply cerdas, dan integrasi CRM.",
    "Kamu bisa coba gratis sekarang dengan klik tombol 'Coba Gratis' di halaman utama!",
    "Apakah ada hal lain yang ingin kamu tanyakan?",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
    pub system_prompt: &'a str,
}
