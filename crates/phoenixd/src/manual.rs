//! Manual page rendering shared by the build script and the tests.

use clap::CommandFactory;
use clap_mangen::Man;
use phoenix_config::Config;

/// Renders the `phoenixd(1)` page from the command-line definition.
pub(crate) fn render_manual(binary: &str, version: &str, date: &str) -> std::io::Result<Vec<u8>> {
    let man = Man::new(Config::command())
        .section("1")
        .source(format!("{binary} {version}"))
        .date(date.to_owned());
    let mut page = Vec::new();
    man.render(&mut page)?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> String {
        let page = render_manual("phoenixd", "0.1.0", "2026-01-01").expect("render manual");
        String::from_utf8(page).expect("utf8 manual")
    }

    #[test]
    fn page_lists_every_environment_variable() {
        let page = page();
        let command = Config::command();
        let documented: Vec<_> = command
            .get_arguments()
            .filter_map(clap::Arg::get_env)
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert!(documented.contains(&"PORT".to_owned()));
        assert!(documented.len() > 1, "every setting carries an environment fallback");
        for name in documented {
            assert!(page.contains(&name), "manual page is missing {name}");
        }
    }

    #[test]
    fn page_header_carries_name_and_version() {
        let page = page();
        assert!(page.contains(".TH"));
        assert!(page.contains("phoenixd 0.1.0"));
    }
}
