//! Framework classification from process command lines.

use std::sync::LazyLock;

use regex::Regex;

/// Ordered classification rules, first match wins.
///
/// Order is load-bearing: specific tools come before the broad runtime
/// rules that would otherwise shadow them (a Next.js server command also
/// contains "node"; Turbopack must win over plain "turbo" tooling before
/// "node" gets a chance). Patterns are matched against a lowercased
/// haystack, so they are written in lowercase.
const RULES: &[(&str, &str)] = &[
    (r"next[\s-]server|next[\s-]dev|\.next", "Next.js"),
    (r"vite", "Vite"),
    (r"nuxt", "Nuxt"),
    (r"remix[\s-]serve", "Remix"),
    (r"angular", "Angular"),
    (r"svelte[\s-]kit|svelte", "SvelteKit"),
    (r"astro", "Astro"),
    (r"webpack[\s-]dev[\s-]server|webpack", "Webpack"),
    (r"parcel", "Parcel"),
    (r"gatsby", "Gatsby"),
    (r"expo", "Expo"),
    (r"storybook", "Storybook"),
    (r"esbuild", "esbuild"),
    (r"turbopack|turbo", "Turbopack"),
    (r"node", "Node"),
    (r"bun", "Bun"),
    (r"deno", "Deno"),
    (r"python|flask|django|uvicorn|gunicorn", "Python"),
    (r"ruby|rails|puma", "Rails"),
    (r"php|artisan|laravel", "Laravel"),
];

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(pattern, label)| {
            // Patterns are compile-time constants, so construction cannot fail.
            let regex = Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid framework pattern {pattern:?}: {e}"));
            (regex, *label)
        })
        .collect()
});

/// Detect the framework behind a process from its command lines.
///
/// Matches the ordered rule list against the lowercased concatenation of
/// the full command line and the short command name; the first matching
/// rule provides the label. Returns `None` when nothing matches, in which
/// case the process is not considered a dev server.
///
/// # Examples
/// ```
/// use devkill_core::detect_framework;
///
/// assert_eq!(detect_framework("node /app/node_modules/.bin/vite", "node"), Some("Vite"));
/// assert_eq!(detect_framework("next-server (v14.2.3)", "next-server"), Some("Next.js"));
/// assert_eq!(detect_framework("/usr/sbin/sshd -D", "sshd"), None);
/// ```
pub fn detect_framework(full_command: &str, short_command: &str) -> Option<&'static str> {
    let haystack = format!("{full_command} {short_command}").to_lowercase();
    COMPILED_RULES
        .iter()
        .find(|(regex, _)| regex.is_match(&haystack))
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_rules_win_over_broad_runtimes() {
        // A Next.js server command also contains "node"; the Next.js rule
        // must fire first.
        assert_eq!(
            detect_framework("node /app/.next/standalone/server.js", "node"),
            Some("Next.js")
        );
        assert_eq!(detect_framework("next-server (v14.2.3)", "node"), Some("Next.js"));
        assert_eq!(detect_framework("next dev --turbo", "node"), Some("Next.js"));
        assert_eq!(
            detect_framework("node /app/node_modules/.bin/vite --port 5173", "node"),
            Some("Vite")
        );
    }

    #[test]
    fn test_broad_runtime_fallbacks() {
        assert_eq!(detect_framework("node server.js", "node"), Some("Node"));
        assert_eq!(detect_framework("bun run dev", "bun"), Some("Bun"));
        assert_eq!(detect_framework("deno run --allow-net main.ts", "deno"), Some("Deno"));
    }

    #[test]
    fn test_python_family() {
        assert_eq!(
            detect_framework("python manage.py runserver", "python"),
            Some("Python")
        );
        assert_eq!(
            detect_framework("gunicorn app:create_app()", "gunicorn"),
            Some("Python")
        );
        assert_eq!(
            detect_framework("uvicorn main:app --reload", "uvicorn"),
            Some("Python")
        );
    }

    #[test]
    fn test_turbopack_before_node() {
        assert_eq!(detect_framework("turbo run dev", "turbo"), Some("Turbopack"));
    }

    #[test]
    fn test_separator_variants() {
        assert_eq!(detect_framework("remix serve build", "node"), Some("Remix"));
        assert_eq!(detect_framework("remix-serve build", "node"), Some("Remix"));
        assert_eq!(
            detect_framework("webpack-dev-server --hot", "node"),
            Some("Webpack")
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(detect_framework("NODE SERVER.JS", "NODE"), Some("Node"));
        assert_eq!(detect_framework("Vite --port 5173", ""), Some("Vite"));
    }

    #[test]
    fn test_short_command_contributes() {
        // The full command line may be unresolved; the short name alone
        // can still classify.
        assert_eq!(detect_framework("", "node"), Some("Node"));
        assert_eq!(detect_framework("", "vite"), Some("Vite"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(detect_framework("/usr/sbin/sshd -D", "sshd"), None);
        assert_eq!(detect_framework("postgres -D /var/lib/pgdata", "postgres"), None);
        assert_eq!(detect_framework("", ""), None);
    }

    #[test]
    fn test_dot_next_is_literal() {
        // The Next.js rule matches a literal ".next" path segment, not any
        // character followed by "next".
        assert_eq!(
            detect_framework("node /srv/app/.next/server/index.js", "node"),
            Some("Next.js")
        );
        assert_eq!(detect_framework("annexture --serve", "annexture"), None);
    }

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(COMPILED_RULES.len(), RULES.len());
    }
}
