use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use safe_delete_core::metadata::{FileAnalysis, Preview, SizeProfile};
use safe_delete_core::{ProgressReporter, TrashEntry};
use std::cell::RefCell;
use std::path::Path;

/// Files smaller than this hash too fast for a bar to be worth drawing.
const PROGRESS_BAR_MIN_BYTES: u64 = 8 * 1024 * 1024;

const BANNER_WIDTH: usize = 60;

/// CLI reporter: indicatif bar while hashing large files, coloured banners
/// for everything else.
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

pub fn rule(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}

impl ProgressReporter for CliReporter {
    fn on_hash_start(&self, total_bytes: u64) {
        if total_bytes < PROGRESS_BAR_MIN_BYTES {
            return;
        }
        let pb = ProgressBar::new(total_bytes);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Hashing [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta} remaining)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        *self.bar.borrow_mut() = Some(pb);
    }

    fn on_hash_progress(&self, bytes_read: u64) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(bytes_read);
        }
    }

    fn on_hash_complete(&self, _digest: &str) {
        self.finish_bar();
    }

    fn on_analysis_complete(&self, analysis: &FileAnalysis) {
        let record = &analysis.record;

        println!("\n{}", rule('═', BANNER_WIDTH));
        println!(" {}", "FILE METADATA".bold());
        println!("{}", rule('═', BANNER_WIDTH));
        println!("{}", record);
        println!("{}", rule('═', BANNER_WIDTH));

        print_preview(&analysis.preview);

        println!(
            "\n{} SHA-256: {}",
            "[Hash]".cyan(),
            record.sha256_digest
        );
        println!(
            "{} Entropy: {:.4} bits/byte ({})",
            "[Analysis]".cyan(),
            record.entropy_bits_per_byte,
            analysis.entropy_class
        );
        println!("{} Size: {}", "[Analysis]".cyan(), analysis.size_profile);
        print_recreation_effort(&analysis.size_profile);

        println!("\n{}", rule('!', 70).yellow());
        println!(
            "{}",
            "!!! WARNING: This will move the file to the trash (recoverable)".yellow()
        );
        println!("{}", rule('!', 70).yellow());
    }

    fn on_backup_created(&self, backup_path: &Path) {
        println!("{} Backup created: {}", "[Info]".cyan(), backup_path.display());
    }

    fn on_trashed(&self, entry: &TrashEntry) {
        println!(
            "\n{} File moved to trash: {}",
            "[Success]".green(),
            entry.trash_path.display()
        );
        println!(
            "{} Backup kept at: {}",
            "[Info]".cyan(),
            entry.backup_path.display()
        );
    }

    fn on_cancelled(&self, _path: &Path) {
        println!("\n{} Operation cancelled by user.", "[Info]".cyan());
    }
}

fn print_preview(preview: &Preview) {
    match preview {
        Preview::Lines(lines) => {
            println!("\n[Preview] First {} lines (text preview only):", lines.len());
            for (i, line) in lines.iter().enumerate() {
                println!("  {:02}: {}", i + 1, line);
            }
        }
        Preview::Empty => {
            println!("\n[Preview]");
            println!("  {}", "<File appears empty>".dimmed());
        }
        Preview::Binary => {
            println!("\n[Preview]");
            println!("  {}", "<Binary file - text preview not available>".dimmed());
        }
    }
}

fn print_recreation_effort(profile: &SizeProfile) {
    if profile.size_bytes == 0 {
        println!("{} Estimated recreation effort: Unknown or zero", "[Analysis]".cyan());
    } else {
        println!(
            "{} Estimated recreation effort: {:.1} arbitrary units",
            "[Analysis]".cyan(),
            profile.recreation_effort
        );
    }
}
