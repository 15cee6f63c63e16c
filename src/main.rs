#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;
    use scene_journey::{architecture::ModuleHost, config::ShellConfig, lessons, shell};

    #[derive(Parser, Debug)]
    #[command(author, version, about, long_about = None)]
    pub struct Args {
        /// Lesson to open, e.g. "/geometry"
        #[arg(short, long)]
        pub route: Option<String>,

        /// TOML file with shell settings
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Print the lesson menu and exit
        #[arg(long, default_value_t = false)]
        pub list: bool,

        /// Window width, overriding the config file
        #[arg(long)]
        pub width: Option<u32>,

        /// Window height, overriding the config file
        #[arg(long)]
        pub height: Option<u32>,
    }

    impl Args {
        /// Command line values win over the config file.
        pub fn apply(&self, config: &mut ShellConfig) {
            if let Some(width) = self.width {
                config.width = width;
            }
            if let Some(height) = self.height {
                config.height = height;
            }
        }
    }

    pub fn main() -> anyhow::Result<()> {
        let args = Args::parse();
        let mut config = match &args.config {
            Some(path) => ShellConfig::load(path)?,
            None => ShellConfig::default(),
        };
        args.apply(&mut config);

        let application = lessons::application(&config.default_route)?;
        if args.list {
            for item in application.menu_items(&config.menu) {
                println!("{:<24} {}", item.path, item.title);
            }
            return Ok(());
        }
        shell::run(application, config, args.route)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn size_flags_override_the_config() {
            let args = Args::parse_from(["scene-journey", "--width", "640", "--route", "/geometry"]);
            let mut config = ShellConfig::default();
            args.apply(&mut config);
            assert_eq!((config.width, config.height), (640, 720));
            assert_eq!(args.route.as_deref(), Some("/geometry"));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
