use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

/// Ask a question and read one line of answer
pub fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Ask for a path; an empty answer means the operator cancelled
pub fn ask_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<Option<PathBuf>> {
    let answer = ask(input, output, question)?;
    Ok(if answer.is_empty() {
        None
    } else {
        Some(PathBuf::from(answer))
    })
}

/// Ask a yes/no question, anything not starting with `y` is a no
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    let answer = ask(input, output, question)?;
    Ok(answer.starts_with('y') || answer.starts_with('Y'))
}
