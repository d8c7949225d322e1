use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  SEALFILE_PASSWORD="supersecret" sealfile encrypt notes.txt notes.sealed
    if let Ok(pw) = std::env::var("SEALFILE_PASSWORD") {
        // an empty password is allowed here; strength policy is the caller's
        return Ok(Zeroizing::new(pw));
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | sealfile decrypt notes.sealed notes.txt
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let pw = rpassword::prompt_password("Password: ")?;
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    bail!("No password provided")
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
