/// Bundles the plugin through nih_plug_xtask. Usage:
///
///   cargo xtask bundle ping-pong-delay --release
///
/// The CLAP and VST3 bundles land in `target/bundled/`.
fn main() -> nih_plug_xtask::Result<()> {
    nih_plug_xtask::main()
}
