//! Bundler pass-through.
//!
//! Renders the build settings in the shape the frontend bundler reads
//! (`vue.config.js`), with every field passed through unchanged.

use serde::Serialize;

use crate::config::schema::DevConfig;

/// Top-level bundler configuration object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    pub configure_webpack: WebpackConfig,
    pub transpile_dependencies: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackConfig {
    pub entry: String,
    pub dev_server: WebpackDevServer,
    pub watch: bool,
    pub watch_options: WebpackWatchOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebpackDevServer {
    pub allowed_hosts: Vec<String>,
    pub hot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebpackWatchOptions {
    /// Regex source of the ignore pattern.
    pub ignored: String,
    pub poll: Poll,
}

/// `poll` is either an interval in milliseconds or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Poll {
    Interval(u64),
    Disabled(bool),
}

impl From<&DevConfig> for BundlerConfig {
    fn from(config: &DevConfig) -> Self {
        let poll = match config.watch_options.poll_ms {
            0 => Poll::Disabled(false),
            ms => Poll::Interval(ms),
        };

        Self {
            configure_webpack: WebpackConfig {
                entry: config.entry.clone(),
                dev_server: WebpackDevServer {
                    allowed_hosts: config.dev_server.allowed_hosts.clone(),
                    hot: config.dev_server.hot,
                },
                watch: config.watch,
                watch_options: WebpackWatchOptions {
                    ignored: config.watch_options.ignored.clone(),
                    poll,
                },
            },
            transpile_dependencies: config.transpile_dependencies,
        }
    }
}

impl BundlerConfig {
    pub fn to_json(&self) -> serde_json::Value {
        // Plain structs of strings, bools and integers always serialize.
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_shape() {
        let bundler = BundlerConfig::from(&DevConfig::default());

        assert_eq!(
            bundler.to_json(),
            json!({
                "configureWebpack": {
                    "entry": "./src/main.js",
                    "devServer": {
                        "allowedHosts": ["careertrack.ddns.net", "localhost"],
                        "hot": true
                    },
                    "watch": true,
                    "watchOptions": {
                        "ignored": "node_modules",
                        "poll": 1000
                    }
                },
                "transpileDependencies": true
            })
        );
    }

    #[test]
    fn test_native_watch_renders_poll_false() {
        let mut config = DevConfig::default();
        config.watch_options.poll_ms = 0;

        let json = BundlerConfig::from(&config).to_json();
        assert_eq!(json["configureWebpack"]["watchOptions"]["poll"], json!(false));
    }
}
