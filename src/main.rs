fn main() -> anyhow::Result<()> {
    docanalyzer_lib::run()
}
