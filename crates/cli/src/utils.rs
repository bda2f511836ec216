use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Crates whose records are shown at the requested verbosity. Everything
/// else (dependencies) is limited to warnings.
const OWN_TARGETS: [&str; 2] = ["docserve", "docserve_server"];

pub const fn level(verbose: bool) -> LevelFilter {
	if verbose {
		LevelFilter::Debug
	} else {
		LevelFilter::Info
	}
}

/// Send every log record to stderr, keeping stdout for command output.
pub fn logs(verbose: bool) -> Result<(), log::SetLoggerError> {
	let colors = ColoredLevelConfig::new()
		.info(Color::Green)
		.error(Color::Red)
		.warn(Color::Yellow)
		.debug(Color::BrightBlack);

	let dispatch = OWN_TARGETS.into_iter().fold(
		fern::Dispatch::new().level(LevelFilter::Warn),
		|dispatch, target| dispatch.level_for(target, level(verbose)),
	);

	dispatch
		.format(move |out, message, record| {
			if verbose {
				out.finish(format_args!(
					"{:>5} {}: {message}",
					colors.color(record.level()),
					record.target()
				));
			} else {
				out.finish(format_args!("{:>5} {message}", colors.color(record.level())));
			}
		})
		.chain(std::io::stderr())
		.apply()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_flag_raises_own_crates_only() {
		assert_eq!(level(true), LevelFilter::Debug);
		assert_eq!(level(false), LevelFilter::Info);
		assert!(OWN_TARGETS.contains(&"docserve_server"));
	}
}
