fn main() -> anyhow::Result<()> {
    invoice_ocr_lib::run()
}
