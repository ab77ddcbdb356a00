//! Runtime-shim registry
//!
//! Calls to C standard-library functions are rewritten to functions in the
//! `noarch` runtime package that ships with the emitted code. The registry
//! maps the C name to the Go name; the shim implementations themselves are
//! external to this crate. Lookups that miss produce an unresolved-name
//! call plus a diagnostic at the call site.
//!
//! The registry is built once and never mutated, so it can be shared
//! read-only across translation units translated in parallel.

use std::collections::HashMap;

/// Import path of the runtime package in emitted code
pub const NOARCH_IMPORT: &str = "github.com/cgt/runtime/noarch";

/// Package qualifier of the runtime package
pub const NOARCH_PACKAGE: &str = "noarch";

/// Helper used when a C logical/comparison result feeds an integer context
pub const BOOL_TO_INT: &str = "BoolToInt32";

/// Helper that materializes a string literal as a NUL-terminated `[]int8`
pub const C_STRING: &str = "CString";

/// One shim entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shim {
    pub c_name: &'static str,
    pub go_name: &'static str,
}

/// Immutable C-name to Go-name mapping for the standard library
#[derive(Debug)]
pub struct ShimRegistry {
    entries: HashMap<&'static str, Shim>,
}

impl ShimRegistry {
    /// The registry for the supported libc subset
    pub fn standard() -> Self {
        let table: &[(&str, &str)] = &[
            // stdio
            ("printf", "Printf"),
            ("fprintf", "Fprintf"),
            ("sprintf", "Sprintf"),
            ("snprintf", "Snprintf"),
            ("scanf", "Scanf"),
            ("sscanf", "Sscanf"),
            ("puts", "Puts"),
            ("putchar", "Putchar"),
            ("getchar", "Getchar"),
            ("fopen", "Fopen"),
            ("fclose", "Fclose"),
            ("fgets", "Fgets"),
            ("fputs", "Fputs"),
            ("fgetc", "Fgetc"),
            ("fputc", "Fputc"),
            ("fread", "Fread"),
            ("fwrite", "Fwrite"),
            // string.h
            ("strlen", "Strlen"),
            ("strcpy", "Strcpy"),
            ("strncpy", "Strncpy"),
            ("strcat", "Strcat"),
            ("strncat", "Strncat"),
            ("strcmp", "Strcmp"),
            ("strncmp", "Strncmp"),
            ("strchr", "Strchr"),
            ("strrchr", "Strrchr"),
            ("strstr", "Strstr"),
            ("memcpy", "Memcpy"),
            ("memmove", "Memmove"),
            ("memset", "Memset"),
            ("memcmp", "Memcmp"),
            // stdlib.h
            ("malloc", "Malloc"),
            ("calloc", "Calloc"),
            ("realloc", "Realloc"),
            ("free", "Free"),
            ("atoi", "Atoi"),
            ("atol", "Atol"),
            ("atof", "Atof"),
            ("abs", "Abs"),
            ("labs", "Labs"),
            ("rand", "Rand"),
            ("srand", "Srand"),
            ("exit", "Exit"),
            ("abort", "Abort"),
            // math.h
            ("sqrt", "Sqrt"),
            ("pow", "Pow"),
            ("sin", "Sin"),
            ("cos", "Cos"),
            ("tan", "Tan"),
            ("fabs", "Fabs"),
            ("floor", "Floor"),
            ("ceil", "Ceil"),
            ("exp", "Exp"),
            ("log", "Log"),
            ("log10", "Log10"),
            ("fmod", "Fmod"),
            // assert.h
            ("assert", "Assert"),
            // ctype.h
            ("isalpha", "IsAlpha"),
            ("isdigit", "IsDigit"),
            ("isspace", "IsSpace"),
            ("toupper", "ToUpper"),
            ("tolower", "ToLower"),
        ];

        let mut entries = HashMap::with_capacity(table.len());
        for (c_name, go_name) in table {
            entries.insert(*c_name, Shim { c_name, go_name });
        }
        Self { entries }
    }

    pub fn lookup(&self, c_name: &str) -> Option<&Shim> {
        self.entries.get(c_name)
    }

    /// All entries, sorted by C name (for the `cgt shims` listing)
    pub fn entries(&self) -> Vec<&Shim> {
        let mut all: Vec<&Shim> = self.entries.values().collect();
        all.sort_by_key(|s| s.c_name);
        all
    }
}

impl Default for ShimRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
