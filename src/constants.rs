// Browser-side constants: element ids, storage keys and renderer settings.
// Page markup must use the same ids; the wasm module only looks elements up.

// Mount point for the animated background
pub const CANVAS_CONTAINER_ID: &str = "canvas-container";
pub const SURFACE_MARKER_ATTR: &str = "data-scene-surface";

// Auth page
pub const AUTH_FORM_ID: &str = "auth-form";
pub const AUTH_EMAIL_ID: &str = "auth-email";
pub const AUTH_PASSWORD_ID: &str = "auth-password";
pub const AUTH_SUBMIT_ID: &str = "auth-submit";
pub const AUTH_HEADING_ID: &str = "auth-heading";
pub const AUTH_SUBHEADING_ID: &str = "auth-subheading";
pub const AUTH_TOGGLE_SIGN_UP_ID: &str = "auth-toggle-sign-up";
pub const AUTH_TOGGLE_RESET_ID: &str = "auth-toggle-reset";

// Landing page
pub const NAV_ACCOUNT_BUTTON_ID: &str = "nav-account";
pub const GET_STARTED_BUTTON_ID: &str = "get-started";

// Dashboard
pub const DASHBOARD_ROOT_ID: &str = "dashboard";
pub const DASHBOARD_EMAIL_ID: &str = "profile-email";
pub const DASHBOARD_HEADLINES_ID: &str = "stat-headlines";
pub const DASHBOARD_CHART_ID: &str = "stat-chart";
pub const DASHBOARD_ACTIVITY_ID: &str = "activity-feed";
pub const SIGN_OUT_BUTTON_ID: &str = "sign-out";

// Notifications
pub const TOAST_ID: &str = "toast";
pub const TOAST_TITLE_ID: &str = "toast-title";
pub const TOAST_DESCRIPTION_ID: &str = "toast-description";
pub const TOAST_DURATION_MS: i32 = 4000;

// Session persistence
pub const SESSION_STORAGE_KEY: &str = "testerz.session";

// Renderer
pub const MSAA_SAMPLES: u32 = 4;
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0; // caps backing-store size on dense displays
pub const CHART_BAR_MAX_PX: f32 = 120.0;
