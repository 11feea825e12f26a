//! Guide command implementation.

use colored::Colorize;
use tuner_core::Settings;

const PLAYGROUND_URL: &str = "https://platform.openai.com/playground";

/// Print the fine-tuning workflow, filled in with the configured dataset path.
pub fn execute(settings: &Settings) {
    let dataset = settings.dataset_path();
    let dataset = dataset.display();

    println!("{}", "Fine-tuning workflow".bold().cyan());
    println!();
    println!("{}", "1. Configure credentials".bold());
    println!("   tuner settings set --api-key <KEY> [--org-id <ORG>]");
    println!();
    println!("{}", "2. Collect examples".bold());
    println!("   tuner dataset append --user \"<prompt>\" --assistant \"<ideal reply>\"");
    println!("   Examples are written to {}. Aim for at least 10; 50 to 100 is typical.", dataset);
    println!();
    println!("{}", "3. Validate the dataset".bold());
    println!("   tuner dataset validate");
    println!("   Fix any reported format errors and check the token limit warnings.");
    println!();
    println!("{}", "4. Upload it".bold());
    println!("   tuner files upload {}", dataset);
    println!();
    println!("{}", "5. Start training".bold());
    println!("   tuner jobs create [--suffix <name>] [--epochs <n>]");
    println!("   The uploaded file id is reused automatically.");
    println!();
    println!("{}", "6. Follow progress".bold());
    println!("   tuner jobs get");
    println!("   tuner jobs events");
    println!();
    println!("{}", "7. Try the model".bold());
    println!("   When the job succeeds, pick the fine-tuned model in the playground:");
    println!("   {}", PLAYGROUND_URL.underline());
    println!();
    println!("{}", "Clean up with `tuner jobs cancel` or `tuner models delete <MODEL>`.".dimmed());
}
