use std::io::{self, BufRead, Write};

use safe_delete_core::ConfirmationProvider;

/// Yes/no confirmation read from stdin. Re-asks until the answer is
/// recognisable.
pub struct StdinConfirmation;

impl ConfirmationProvider for StdinConfirmation {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        prompt_confirm(prompt, &mut stdin.lock(), &mut io::stdout())
    }
}

pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_confirm(
    prompt: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> io::Result<bool> {
    let mut line = String::new();

    loop {
        line.clear();

        write!(output, "\n{} (yes/no): ", prompt)?;
        output.flush()?;

        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer on stdin",
            ));
        }

        match line.trim().to_lowercase().as_str() {
            "yes" | "y" | "ye" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => {
                writeln!(output, "Please respond with 'yes' or 'no'.")?;
                continue;
            }
        }
    }
}
