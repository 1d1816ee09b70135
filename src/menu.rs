//! Interactive numbered menu.

use crate::commands::{AddCommand, ExportCommand, RescanCommand, Services};
use crate::config::Config;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

const ACTIONS: [&str; 4] = ["Add items", "Export items", "Rescan prices", "Exit"];

/// What the user picked in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Export,
    Rescan,
    Exit,
}

impl Action {
    fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim().parse::<usize>().ok()? {
            1 => Some(Action::Add),
            2 => Some(Action::Export),
            3 => Some(Action::Rescan),
            4 => Some(Action::Exit),
            _ => None,
        }
    }
}

/// Prompt loop over any line input and text output.
///
/// Command failures are printed and the loop continues. End of input exits.
pub struct Menu<'a, R, W> {
    config: &'a Config,
    services: &'a Services,
    add_command: AddCommand,
    export_command: ExportCommand,
    rescan_command: RescanCommand,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    /// Creates a menu reading from `input` and printing to `output`.
    pub fn new(config: &'a Config, services: &'a Services, input: R, output: W) -> Self {
        Self {
            config,
            services,
            add_command: AddCommand::new(config.clone()),
            export_command: ExportCommand::new(config.clone()),
            rescan_command: RescanCommand::new(config.clone()),
            input,
            output,
        }
    }

    /// Runs until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        if self.config.enable_auto_scan {
            writeln!(self.output, "Checking stored prices...")?;
            self.rescan().await?;
        }

        loop {
            writeln!(self.output, "Please select an action:")?;
            for (i, action) in ACTIONS.iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, action)?;
            }

            let Some(choice) = self.prompt("Enter the number corresponding to the action: ")? else {
                break;
            };

            match Action::from_choice(&choice) {
                Some(Action::Add) => self.add().await?,
                Some(Action::Export) => self.export().await?,
                Some(Action::Rescan) => self.rescan().await?,
                Some(Action::Exit) => break,
                None => writeln!(self.output, "Invalid action number")?,
            }
        }

        debug!("Menu closed");
        Ok(())
    }

    async fn add(&mut self) -> Result<()> {
        writeln!(self.output, "Please select the category:")?;
        for (i, category) in self.config.categories.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, category)?;
        }

        let Some(choice) = self.prompt("Enter the number corresponding to the category: ")? else {
            return Ok(());
        };

        let category = match choice.parse::<usize>() {
            Ok(n) if (1..=self.config.categories.len()).contains(&n) => {
                self.config.categories[n - 1].clone()
            }
            _ => {
                writeln!(self.output, "Invalid category number")?;
                return Ok(());
            }
        };

        loop {
            let Some(url) =
                self.prompt("Please enter the product URL (or type 'back' to return): ")?
            else {
                return Ok(());
            };

            if url.eq_ignore_ascii_case("back") || url.eq_ignore_ascii_case("exit") {
                return Ok(());
            }
            if url.is_empty() {
                continue;
            }

            match self.add_command.execute_with(self.services, &category, &[url]).await {
                Ok(summary) => writeln!(self.output, "{}", summary)?,
                Err(e) => writeln!(self.output, "Error: {:#}", e)?,
            }
        }
    }

    async fn export(&mut self) -> Result<()> {
        match self.export_command.execute_with(self.services, &self.config.report_path).await {
            Ok(message) => writeln!(self.output, "{}", message)?,
            Err(e) => writeln!(self.output, "Error: {:#}", e)?,
        }
        Ok(())
    }

    async fn rescan(&mut self) -> Result<()> {
        match self.rescan_command.execute_with(self.services).await {
            Ok(outcome) => writeln!(self.output, "{}", outcome)?,
            Err(e) => writeln!(self.output, "Error: {:#}", e)?,
        }
        Ok(())
    }

    /// Prints `message` and reads one trimmed line, or `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{ikea_page, MockFetcher, MockRates};
    use crate::store::{JsonFileStore, ProductStore};
    use std::io::Cursor;
    use tempfile::TempDir;

    const LAMPA: &str = "https://www.ikea.com/se/sv/p/lampa-1/";

    fn setup(dir: &TempDir) -> (Config, Services) {
        let mut config = Config::default();
        config.store_path = dir.path().join("data.json");
        config.report_path = dir.path().join("product_list.html");

        let fetcher = MockFetcher::new();
        fetcher.set_page(LAMPA, ikea_page("Lampa", "199"));
        let services = Services::new(
            fetcher,
            MockRates::sek_to_gbp(0.071),
            JsonFileStore::new(&config.store_path),
        );
        (config, services)
    }

    async fn run(config: &Config, services: &Services, input: &str) -> String {
        let mut output = Vec::new();
        Menu::new(config, services, Cursor::new(input.as_bytes()), &mut output).run().await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_action_from_choice() {
        assert_eq!(Action::from_choice("1"), Some(Action::Add));
        assert_eq!(Action::from_choice(" 4 "), Some(Action::Exit));
        assert_eq!(Action::from_choice("5"), None);
        assert_eq!(Action::from_choice("add"), None);
    }

    #[tokio::test]
    async fn test_exit() {
        let dir = TempDir::new().unwrap();
        let (config, services) = setup(&dir);

        let output = run(&config, &services, "4\n").await;
        assert!(output.contains("1. Add items"));
        assert!(output.contains("3. Rescan prices"));
        assert_eq!(output.matches("Please select an action:").count(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_exits() {
        let dir = TempDir::new().unwrap();
        let (config, services) = setup(&dir);

        let output = run(&config, &services, "").await;
        assert!(output.contains("Enter the number corresponding to the action: "));
    }

    #[tokio::test]
    async fn test_add_flow() {
        let dir = TempDir::new().unwrap();
        let (config, services) = setup(&dir);

        let input = format!("1\n1\n{}\nhttps://www.example.com/x\nback\n4\n", LAMPA);
        let output = run(&config, &services, &input).await;

        assert!(output.contains("1. Kitchen"));
        assert!(output.contains("Added #1 to Kitchen: Lampa (199.00 SEK) / 14.13 GBP"));
        assert!(output.contains("Skipped https://www.example.com/x: Unsupported website"));

        let catalog = JsonFileStore::new(&config.store_path).load();
        assert_eq!(catalog["Kitchen"].len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_numbers() {
        let dir = TempDir::new().unwrap();
        let (config, services) = setup(&dir);

        let output = run(&config, &services, "9\n1\n42\n4\n").await;
        assert!(output.contains("Invalid action number"));
        assert!(output.contains("Invalid category number"));
        assert_eq!(output.matches("Please select an action:").count(), 3);
    }

    #[tokio::test]
    async fn test_export_and_rescan() {
        let dir = TempDir::new().unwrap();
        let (config, services) = setup(&dir);

        let input = format!("1\n1\n{}\nexit\n3\n2\n4\n", LAMPA);
        let output = run(&config, &services, &input).await;

        assert!(output.contains("No changes in prices"));
        assert!(output.contains("HTML file saved to"));
        let html = std::fs::read_to_string(&config.report_path).unwrap();
        assert!(html.contains("Lampa"));
    }

    #[tokio::test]
    async fn test_auto_scan_runs_first() {
        let dir = TempDir::new().unwrap();
        let (mut config, services) = setup(&dir);
        config.enable_auto_scan = true;

        let output = run(&config, &services, "4\n").await;
        let scan = output.find("No changes in prices").unwrap();
        let menu = output.find("Please select an action:").unwrap();
        assert!(scan < menu);
    }
}
