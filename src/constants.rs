//! Central constants for the readgo library

/// Limits applied when reading source files
pub mod files {
    /// Largest file `safe_read` will load (10 MiB)
    pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Largest file `read_file` will load (1 MiB)
    pub const MAX_READ_SIZE: u64 = 1024 * 1024;

    /// Extensions the reader is allowed to open
    pub const ALLOWED_EXTENSIONS: &[&str] = &["go", "mod", "sum"];

    /// Go source file extension
    pub const GO_EXTENSION: &str = "go";

    /// Suffix of Go test files
    pub const TEST_SUFFIX: &str = "_test.go";

    /// Markers identifying generated files
    pub const GENERATED_MARKERS: &[&str] = &[
        "Code generated",
        "DO NOT EDIT",
        "@generated",
        "// Generated by",
        "/* Generated by",
    ];
}

/// Go module and toolchain layout
pub mod module {
    /// Name of the module definition file
    pub const GO_MOD_FILE: &str = "go.mod";

    /// Vendor directory name
    pub const VENDOR_DIR: &str = "vendor";

    /// Directory name the go tool never treats as a package
    pub const TESTDATA_DIR: &str = "testdata";

    /// Environment variable naming the module cache
    pub const GOMODCACHE_ENV: &str = "GOMODCACHE";

    /// Environment variable naming the GOPATH
    pub const GOPATH_ENV: &str = "GOPATH";

    /// Environment variable naming the Go installation root
    pub const GOROOT_ENV: &str = "GOROOT";

    /// Suffix of external test package names
    pub const EXTERNAL_TEST_SUFFIX: &str = "_test";

    /// Environment variable overriding the target operating system
    pub const GOOS_ENV: &str = "GOOS";

    /// Environment variable overriding the target architecture
    pub const GOARCH_ENV: &str = "GOARCH";

    /// Operating systems recognized as `_GOOS` file name suffixes
    pub const KNOWN_OS: &[&str] = &[
        "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js",
        "linux", "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
    ];

    /// Architectures recognized as `_GOARCH` file name suffixes
    pub const KNOWN_ARCH: &[&str] = &[
        "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips",
        "mipsle", "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le",
        "riscv", "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
    ];
}

/// Default values for analyzer options
pub mod defaults {
    use std::time::Duration;

    /// Default cache time-to-live
    pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

    /// Default maximum entries per cache kind
    pub const MAX_CACHE_SIZE: usize = 1000;

    /// Default analysis timeout
    pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default working directory
    pub const WORK_DIR: &str = ".";
}

/// Default values for configuration
pub mod config {
    /// Default configuration file name
    pub const DEFAULT_CONFIG_FILE: &str = "readgo.yaml";
}

/// Codes attached to validation errors
pub mod codes {
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const PACKAGE_ERROR: &str = "PACKAGE_ERROR";
    pub const DEPENDENCY_ERROR: &str = "DEPENDENCY_ERROR";
    pub const CIRCULAR_DEPENDENCY: &str = "CIRCULAR_DEPENDENCY";
}

/// Kinds attached to validation warnings
pub mod warnings {
    pub const BLANK_IMPORT: &str = "blank_import";
    pub const EMPTY_FUNCTION: &str = "empty_function";
    pub const UNUSED_IMPORT: &str = "unused_import";
    pub const UNUSED_VARIABLE: &str = "unused_variable";
    pub const MISSING_DEPENDENCY: &str = "missing_dependency";
}
