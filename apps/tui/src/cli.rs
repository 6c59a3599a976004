use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "pseudodojo", version, about = "PseudoDojo table browser")]
pub struct CliArgs {
    /// Print the selection report and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Pseudopotential type, e.g. nc-sr-v0.4
    #[arg(long, value_name = "TYPE")]
    pub typ: Option<String>,

    /// Exchange-correlation functional
    #[arg(long, value_name = "XC")]
    pub xc: Option<String>,

    /// Accuracy tier
    #[arg(long, value_name = "ACCURACY")]
    pub acc: Option<String>,

    /// File format
    #[arg(long, value_name = "FORMAT")]
    pub fmt: Option<String>,

    /// Report a single element in headless mode
    #[arg(long, value_name = "SYMBOL")]
    pub element: Option<String>,

    /// Probe every link in both tables and exit
    #[arg(long = "check-links")]
    pub check_links: bool,

    /// Override the directory holding files.json and targz.json
    #[arg(long = "data-dir", value_name = "PATH")]
    pub data_dir: Option<String>,

    /// Override the base URL relative links resolve against
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Override database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Override download directory
    #[arg(long = "download-dir", value_name = "PATH")]
    pub download_dir: Option<String>,

    /// Use the light layout (psp8 only)
    #[arg(long)]
    pub light: bool,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(dir) = &self.data_dir {
            std::env::set_var("DOJO_DATA_DIR", dir);
        }
        if let Some(url) = &self.base_url {
            std::env::set_var("DOJO_BASE_URL", url);
        }
        if let Some(db) = &self.db {
            std::env::set_var("DATABASE_NAME", db);
        }
        if let Some(dir) = &self.download_dir {
            std::env::set_var("DOWNLOAD_DIR", dir);
        }
        if self.light {
            std::env::set_var("DOJO_LAYOUT", "light");
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// Values given on the command line, in dropdown order.
    pub fn requested(&self) -> [Option<&str>; 4] {
        [
            self.typ.as_deref(),
            self.xc.as_deref(),
            self.acc.as_deref(),
            self.fmt.as_deref(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selection_flags() {
        let args = CliArgs::parse_from([
            "pseudodojo",
            "--headless",
            "--typ",
            "nc-fr-v0.4",
            "--xc",
            "PBEsol",
            "--element",
            "Si",
        ]);
        assert!(args.headless);
        assert_eq!(args.requested(), [Some("nc-fr-v0.4"), Some("PBEsol"), None, None]);
        assert_eq!(args.element.as_deref(), Some("Si"));
        assert!(!args.check_links);
    }

    #[test]
    fn light_and_link_check_flags() {
        let args = CliArgs::parse_from(["pseudodojo", "--check-links", "--light", "--json"]);
        assert!(args.check_links);
        assert!(args.light);
        assert!(args.json);
        assert_eq!(args.requested(), [None; 4]);
    }
}
