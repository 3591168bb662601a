/// Application name
pub const APP_NAME: &str = "Al Mersal";

/// First internal id handed out when the ledger is empty
pub const INTERNAL_ID_SEED: i64 = 10_082_025;

/// Settings is a singleton row pinned to this id
pub const SETTINGS_ID: i64 = 1;

/// Tier boundaries for the office commission (inclusive upper bounds, MRU)
pub const LOW_TIER_MAX_MRU: i64 = 100;
pub const MID_TIER_MAX_MRU: i64 = 1_000;

/// Default HTTP API port (ledger server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default session lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// Session token size in bytes (hex encoded on the wire)
pub const SESSION_TOKEN_SIZE: usize = 32;

/// Minimum edge length of the rendered receipt QR image, in pixels
pub const QR_MIN_DIMENSION: u32 = 200;

/// Policy text printed on the customer copy until an admin edits it
pub const DEFAULT_POLICIES: &str = "1) يعاد أصل المبلغ فقط عند الإلغاء قبل التنفيذ؛ الرسوم غير مستردة.\n\
2) غير مسؤولين عن تأخير/فقد بسبب بيانات خاطئة أو سياسات المزود.\n\
3) تعديل اسم المستفيد قد يستلزم رسومًا.\n\
4) الحوالات الدولية خاضعة لشروط مزود بلد الاستلام.\n\
5) احتفظ بالوصل ورقم التتبع حتى الاستلام.";
