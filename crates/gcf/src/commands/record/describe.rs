use clap::Args;
use miette::Result;

use super::SchemaName;

#[derive(Args)]
pub struct DescribeArgs {
    /// Record layout to print
    #[arg(short, long, value_enum)]
    schema: SchemaName,
}

impl DescribeArgs {
    pub fn handle(&self) -> Result<()> {
        let descriptor = self.schema.descriptor()?;

        print!("{}", descriptor);
        match descriptor.fixed_size() {
            Some(size) => println!("size: {} bytes", size),
            None if descriptor.consumes_remainder() => println!("size: until end of input"),
            None => println!("size: variable"),
        }

        Ok(())
    }
}
