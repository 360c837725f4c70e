use swiftmess_core::{GroupItems, Tokenizer};

fn main() -> swiftmess_core::Result<()> {
    let input = "{1:F01BANKBEBBAXXX0000999999}{2:O5981519051128BANKDEFFXXXX}{3:{108:REF}}{4:\n\
                 :20:99990212189999\n\
                 :77E:/TREF XXXXXXXXXXXXXXXX\n\
                 /NOIM 000000\n\
                 -}\n";

    println!("Input: {:?}\n", input);
    println!("Items:");
    for item in Tokenizer::from_text(input) {
        println!("  {}", item?);
    }

    println!("\nGroups:");
    for group in Tokenizer::from_text(input).groups() {
        let group = group?;
        match group.block_name() {
            Some(name) => println!("  {} [{}]", group, name),
            None => println!("  {}", group),
        }
    }
    Ok(())
}
