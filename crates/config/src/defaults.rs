pub fn default_enabled() -> bool {
    true
}

pub fn default_version() -> String {
    "1.0.0".to_string()
}

pub fn default_garch_window() -> usize {
    1000
}

pub fn default_garch_horizon() -> usize {
    5
}

pub fn default_min_observations() -> usize {
    30
}

pub fn default_max_iterations() -> usize {
    2000
}

pub fn default_tolerance() -> f64 {
    1e-9
}

pub fn default_fit_timeout() -> u64 {
    30
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_http_port() -> u16 {
    8000
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
