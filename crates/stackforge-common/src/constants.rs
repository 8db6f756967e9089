//! System-wide constants and default values.

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stackforge";

/// Default file name of a persisted project configuration.
pub const CONFIG_FILENAME: &str = ".stackforge.json";

/// Maximum length of a project name.
pub const MAX_PROJECT_NAME_LENGTH: usize = 214;

/// Project names that collide with tooling conventions.
pub const RESERVED_PROJECT_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Port the generated application listens on inside its container.
pub const APP_PORT: u16 = 3000;

/// Port the application's cluster endpoint exposes.
pub const APP_SERVICE_PORT: u16 = 80;

/// Path of the generated application's health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Name of the single network every compose service attaches to.
pub const APP_NETWORK: &str = "app-network";

/// Compose file format version.
pub const COMPOSE_VERSION: &str = "3.8";

/// Default database name used by every managed store.
pub const DEFAULT_DATABASE: &str = "myapp";

/// Placeholder written into every generated secret value.
pub const SECRET_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

/// Placeholder written into the generated token-signing secret.
pub const JWT_SECRET_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION_USE_LONG_RANDOM_STRING";

/// Directory (relative to the output root) holding cluster manifests.
pub const CLUSTER_DIR: &str = "k8s";

/// File name of the compose document.
pub const COMPOSE_FILENAME: &str = "docker-compose.yml";

/// File name of the environment file.
pub const ENV_FILENAME: &str = ".env";

/// File name of the container build ignore list.
pub const DOCKERIGNORE_FILENAME: &str = ".dockerignore";

/// Replica count of the application workload.
pub const APP_REPLICAS: u32 = 3;

/// Replica count of every managed dependency workload.
pub const DEPENDENCY_REPLICAS: u32 = 1;

/// Lower replica bound of the application autoscaler.
pub const HPA_MIN_REPLICAS: u32 = 2;

/// Upper replica bound of the application autoscaler.
pub const HPA_MAX_REPLICAS: u32 = 10;

/// CPU utilisation target (percent) of the application autoscaler.
pub const HPA_CPU_THRESHOLD: u32 = 70;

/// Memory utilisation target (percent) of the application autoscaler.
pub const HPA_MEMORY_THRESHOLD: u32 = 80;
