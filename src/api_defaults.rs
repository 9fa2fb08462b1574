// Partition names are <prefix>-<kind>-<version>. Bumping the version makes
// every partition of the previous version stale on the next activation.
pub const DEFAULT_CACHE_PREFIX: &str = "loqui";
pub const DEFAULT_CACHE_VERSION: &str = "v1";

pub const STATIC_PARTITION: &str = "static";
pub const DYNAMIC_PARTITION: &str = "dynamic";

// Application shell and fonts cached on install. Relative entries resolve
// against the site origin.
pub const DEFAULT_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/src/main.tsx",
    "/src/App.tsx",
    "/src/index.css",
    "/optimized/Loqui events logo.webp",
    "/optimized/20241114_180846.webp",
    "/optimized/image2.webp",
    "/optimized/20240816_190922.webp",
    "/optimized/Portrett bilde, Sandra.webp",
    "/optimized/Apple_Pay-Logo.wine.webp",
    "/vipps icon.webp",
    "/visa.svg",
    "https://fonts.googleapis.com/css2?family=Poppins:wght@300;400;500;600;700&display=swap",
];

// Network timeout for a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: &str = "30s";

pub const DEFAULT_NOTIFICATION_ICON: &str = "/optimized/Loqui events logo.webp";
pub const NOTIFICATION_VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

pub const CONTACT_FORM_SYNC_TAG: &str = "contact-form";

// Synthetic response bodies.
pub const OFFLINE_BODY: &str = "Offline";
pub const ERROR_BODY: &str = "Error";
