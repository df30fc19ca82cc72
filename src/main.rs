fn main() -> anyhow::Result<()> {
    deskclock_lib::run()
}
