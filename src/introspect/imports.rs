// Import resolution for Python modules
//
// Resolves each import binding to the project file it refers to, if any.
// Standard library and third-party names never resolve.

use crate::parser::ImportBinding;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Resolves Python imports to files under a base directory
pub struct ImportResolver {
    /// Directory absolute imports are resolved against
    base: PathBuf,
    /// Set of known stdlib module names
    stdlib_modules: HashSet<&'static str>,
}

impl ImportResolver {
    /// Create a new import resolver rooted at `base`
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            stdlib_modules: Self::load_stdlib_modules(),
        }
    }

    /// Load the set of Python standard library module names
    fn load_stdlib_modules() -> HashSet<&'static str> {
        // Top-level names only
        [
            "abc", "aifc", "argparse", "array", "ast", "asynchat", "asyncio",
            "asyncore", "atexit", "audioop", "base64", "bdb", "binascii",
            "bisect", "builtins", "bz2", "calendar", "cgi", "cgitb",
            "chunk", "cmath", "cmd", "code", "codecs", "codeop", "collections",
            "colorsys", "compileall", "concurrent", "configparser", "contextlib",
            "contextvars", "copy", "copyreg", "cProfile", "crypt", "csv",
            "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal",
            "difflib", "dis", "distutils", "doctest", "email", "encodings",
            "enum", "errno", "faulthandler", "fcntl", "filecmp", "fileinput",
            "fnmatch", "fractions", "ftplib", "functools", "gc", "getopt",
            "getpass", "gettext", "glob", "graphlib", "grp", "gzip", "hashlib",
            "heapq", "hmac", "html", "http", "imaplib", "imghdr",
            "imp", "importlib", "inspect", "io", "ipaddress", "itertools",
            "json", "keyword", "lib2to3", "linecache", "locale", "logging",
            "lzma", "mailbox", "marshal", "math", "mimetypes",
            "mmap", "modulefinder", "multiprocessing", "netrc",
            "numbers", "operator", "optparse", "os",
            "pathlib", "pdb", "pickle", "pickletools", "pipes", "pkgutil",
            "platform", "plistlib", "poplib", "posix", "posixpath", "pprint",
            "profile", "pstats", "pty", "pwd", "py_compile", "pyclbr",
            "pydoc", "queue", "quopri", "random", "re", "readline", "reprlib",
            "resource", "rlcompleter", "runpy", "sched", "secrets", "select",
            "selectors", "shelve", "shlex", "shutil", "signal", "site",
            "smtplib", "socket", "socketserver",
            "sqlite3", "ssl", "stat", "statistics", "string", "stringprep",
            "struct", "subprocess", "symtable", "sys", "sysconfig",
            "syslog", "tabnanny", "tarfile", "tempfile", "termios",
            "textwrap", "threading", "time", "timeit", "tkinter",
            "token", "tokenize", "tomllib", "trace", "traceback", "tracemalloc",
            "tty", "types", "typing", "unicodedata",
            "unittest", "urllib", "uuid", "venv", "warnings", "wave",
            "weakref", "webbrowser", "wsgiref",
            "xml", "xmlrpc", "zipapp", "zipfile", "zipimport", "zlib",
            "typing_extensions", "_thread", "__future__",
        ]
        .into_iter()
        .collect()
    }

    /// Check if a module name is from the standard library
    pub fn is_stdlib(&self, module: &str) -> bool {
        let top_level = module.split('.').next().unwrap_or(module);
        self.stdlib_modules.contains(top_level)
    }

    /// Resolve the binding written as `name` in `current_file`
    ///
    /// For `from X import name` the submodule `X.name` wins over `X`.
    pub fn resolve(&self, name: &str, binding: &ImportBinding, current_file: &Path) -> Option<PathBuf> {
        if binding.is_plain() {
            return self.resolve_absolute(name);
        }

        let level = binding.relative_level();
        if level > 0 {
            return self.resolve_relative(name, binding, current_file, level);
        }

        if self.is_stdlib(&binding.source) {
            return None;
        }
        if name != "*" {
            if let Some(path) = self.resolve_absolute(&format!("{}.{}", binding.source, name)) {
                return Some(path);
            }
        }
        self.resolve_absolute(&binding.source)
    }

    fn resolve_absolute(&self, module: &str) -> Option<PathBuf> {
        if module.is_empty() || self.is_stdlib(module) {
            return None;
        }
        self.find_module_file(&self.base.join(module.replace('.', "/")))
    }

    /// Resolve a relative import (e.g., from ..utils import helper)
    fn resolve_relative(
        &self,
        name: &str,
        binding: &ImportBinding,
        current_file: &Path,
        level: usize,
    ) -> Option<PathBuf> {
        // level=1 means the current package, level=2 its parent, etc.
        let mut base_dir = current_file.parent()?.to_path_buf();
        for _ in 1..level {
            base_dir = base_dir.parent()?.to_path_buf();
        }

        let rest = binding.source.trim_start_matches('.');
        let module_path = if rest.is_empty() {
            base_dir
        } else {
            base_dir.join(rest.replace('.', "/"))
        };

        if name != "*" {
            if let Some(path) = self.find_module_file(&module_path.join(name.replace('.', "/"))) {
                return Some(path);
            }
        }
        self.find_module_file(&module_path)
    }

    /// Find the actual file for a module path
    fn find_module_file(&self, module_path: &Path) -> Option<PathBuf> {
        // Try as a direct .py file
        let py_file = module_path.with_extension("py");
        if py_file.is_file() {
            return Some(py_file);
        }

        // Try as a package (directory with __init__.py)
        let init_file = module_path.join("__init__.py");
        if init_file.is_file() {
            return Some(init_file);
        }

        None
    }
}
