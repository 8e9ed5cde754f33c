//! Viewport classification.

use std::io::Write;

use threadline_core::Device;
use threadline_core::device::MOBILE_MAX_WIDTH_PX;

use super::CliError;

/// Print which presentation a viewport of `width` CSS pixels receives.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn classify(width: u32, out: &mut impl Write) -> Result<(), CliError> {
    let device = Device::from_width(width);
    let relation = if device.is_mobile() { "<=" } else { ">" };
    writeln!(
        out,
        "{} ({width}px {relation} {MOBILE_MAX_WIDTH_PX}px)",
        device.as_str()
    )?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn classified(width: u32) -> String {
        let mut out = Vec::new();
        classify(width, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_breakpoint_is_inclusive() {
        assert_eq!(classified(768), "mobile (768px <= 768px)\n");
        assert_eq!(classified(769), "web (769px > 768px)\n");
        assert_eq!(classified(0), "mobile (0px <= 768px)\n");
    }
}
