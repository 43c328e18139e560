use std::path::Path;

use snrename_rs::prelude::*;

fn main() {
    let extractor = SerialExtractor::default();

    // Lines as they come back from OCR for a few label photos
    let photos = vec![
        ("laptop1.jpg", vec!["ThinkPad T14 Gen 2", "S/N: PF2ABC12", "Made in China"]),
        ("router.png", vec!["Serial Number: 21a7k0q9", "S/N: 21A7K0Q9", "MAC 00:1A:2B:3C:4D:5E"]),
        ("dock.jpeg", vec!["Input 20V 6.75A", "S/N: 1234567"]),
    ];

    for (file, lines) in photos {
        let serials = extractor.extract_all(lines.iter().copied());
        let new_name = target_file_name(Path::new(file), &serials);

        println!("{}", file);
        println!("  serials: {:?}", serials);
        println!("  renamed to: {}", new_name);
        println!("{}", "-".repeat(40));
    }
}
