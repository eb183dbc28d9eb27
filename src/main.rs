fn main() -> Result<(), Box<dyn std::error::Error>> {
    codemint::cli::main()
}
