use crate::constants::{GREEN, RESET};
use crate::version::VERSION;

pub fn ascii_logo() -> String {
    format!(
        r#"
 █████╗ ███╗   ██╗████████╗██████╗  ██████╗ ██╗  ██╗
██╔══██╗████╗  ██║╚══██╔══╝██╔══██╗██╔═══██╗╚██╗██╔╝
███████║██╔██╗ ██║   ██║   ██████╔╝██║   ██║ ╚███╔╝
██╔══██║██║╚██╗██║   ██║   ██╔══██╗██║   ██║ ██╔██╗
██║  ██║██║ ╚████║   ██║   ██████╔╝╚██████╔╝██╔╝ ██╗
╚═╝  ╚═╝╚═╝  ╚═══╝   ╚═╝   ╚═════╝  ╚═════╝ ╚═╝  ╚═╝
Interactive shell for the Antbox ECM server [Version: {green}{version}{reset}]
"#,
        green = GREEN,
        version = VERSION,
        reset = RESET,
    )
}
