//! Reversing a string twice gives it back; a reverse that drops a character
//! is caught and shrunk.

use propcheck::{check, property, string};

fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

fn lossy_reverse(s: &str) -> String {
    reverse(s).chars().take(5).collect()
}

fn main() {
    let involution = property("reverse twice", string(0, 20), |s: &String| {
        reverse(&reverse(s)) == *s
    });
    match check(&involution) {
        Ok(result) => println!("{result}"),
        Err(error) => println!("run aborted: {error}"),
    }

    let lossy = property("lossy reverse keeps length", string(0, 20), |s: &String| {
        lossy_reverse(s).chars().count() == s.chars().count()
    });
    match check(&lossy) {
        // The shrunk input is six copies of the simplest character
        Ok(result) => println!("{result}"),
        Err(error) => println!("run aborted: {error}"),
    }
}
