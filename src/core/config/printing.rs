use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.endpoint {
            Some(endpoint) => println!("  endpoint: {endpoint}"),
            None => println!("  endpoint: {} (default)", self.endpoint_or_default()),
        }
        match &self.data_dir {
            Some(dir) => println!("  data-dir: {}", path_display(dir)),
            None => println!(
                "  data-dir: {} (default)",
                path_display(self.data_dir_or_default())
            ),
        }
        match self.syntax_enabled() {
            true => println!("  syntax: on"),
            false => println!("  syntax: off"),
        }
        println!("  appearance: {}", self.appearance_or_default().as_str());
        println!(
            "  request-timeout: {}s",
            self.request_timeout().as_secs()
        );
    }
}
