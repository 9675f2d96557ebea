//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[RO]");

// Board indicators
pub static BLOCKED: Emoji<'_, '_> = Emoji("🚧 ", "[WIP]");
pub static MOVED: Emoji<'_, '_> = Emoji("➡️  ", "->");
pub static NOTE: Emoji<'_, '_> = Emoji("📝 ", "~");
pub static TRASH: Emoji<'_, '_> = Emoji("🗑️  ", "-");

// Wheel indicators
pub static LIFE: Emoji<'_, '_> = Emoji("🌱 ", "[L]");
pub static BUSINESS: Emoji<'_, '_> = Emoji("💼 ", "[B]");
