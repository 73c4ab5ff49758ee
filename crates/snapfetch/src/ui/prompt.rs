use console::Term;

/// Ask a yes/no question on stderr; `assume_yes` answers without asking.
pub fn confirm(question: &str, assume_yes: bool) -> std::io::Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    let term = Term::stderr();
    loop {
        term.write_str(&format!("{question} [y/n] "))?;
        let line = term.read_line()?;
        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => term.write_line("Please answer y or n.")?,
        }
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
