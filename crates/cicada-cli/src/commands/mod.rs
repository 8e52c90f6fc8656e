pub mod build;
pub mod clean;
pub mod rewrite;
pub mod vendor;
pub mod version;

use cicada_core::Error;

/// Exit code for any failed command.
const EXIT_FAILURE: i32 = 1;

/// Report `err` the way the output mode asks for, then exit.
pub fn fail(err: &Error, json: bool) -> ! {
    if json {
        let error_json = serde_json::json!({
            "ok": false,
            "error": {
                "code": err.code(),
                "message": err.to_string()
            }
        });
        println!("{error_json:#}");
    } else {
        eprintln!("error: {err}");
    }
    std::process::exit(EXIT_FAILURE);
}
