//! Configuration section definitions.
//!
//! | Section       | Purpose                                        |
//! |---------------|------------------------------------------------|
//! | `[paths]`     | Source root, output root, index document       |
//! | `[transpile]` | Source extensions and include path             |
//! | `[inject]`    | Markers delimiting the injected link list      |
//! | `[watch]`     | Event coalescing window                        |
//! | `[serve]`     | Static server and live-reload ports            |

mod inject;
mod paths;
mod serve;
mod transpile;
mod watch;

pub use inject::InjectConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use transpile::TranspileConfig;
pub use watch::WatchConfig;
