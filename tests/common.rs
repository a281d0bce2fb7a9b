#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use savolalab::config::{extract_config, ConfigV1};
use savolalab::navigation::HistoryNavigator;
use savolalab::startup;
use savolalab::state::AppState;
use serde_json::json;

pub const TEST_SECRET: &str = "supersecretkey";

/// Builds a config whose token slot lives at `token_path` and whose backend is `base_url`.
pub fn load_test_config(base_url: &str, token_path: &Path) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
api:
  base_url: "{base_url}"
  timeout_in_ms: 3000
storage:
  enabled: true
  type: file
  path: "{path}"
session:
  verify_secret: "{secret}"
navigation:
  login_path: /login
  unauthorized_path: /unauthorized
  home_path: /dashboard
routes:
  - prefix: /dashboard/users
    roles: [admin, qc_manager]
  - prefix: /dashboard/tests/delete
    roles: [admin, qc_manager, shift_chemist]
"#,
        base_url = base_url,
        path = token_path.display(),
        secret = TEST_SECRET,
    );
    extract_config(&Figment::new().merge(Yaml::string(&yaml)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app(config: ConfigV1) -> (AppState, Arc<HistoryNavigator>) {
    let navigator = Arc::new(HistoryNavigator::new());
    let app = startup::build(Arc::new(config), navigator.clone()).expect("app should build");
    (app, navigator)
}

/// A backend-style access token for `employee_id` expiring `ttl_secs` from now.
pub fn mint_token(employee_id: &str, role: &str, ttl_secs: i64) -> String {
    encode(
        &Header::default(),
        &json!({
            "sub": employee_id,
            "role": role,
            "full_name": "Jane Doe",
            "department": "QC",
            "exp": Utc::now().timestamp() + ttl_secs,
        }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to create token")
}
