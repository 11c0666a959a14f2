//! Order Query and Notification Example
//!
//! Queries an order on the gateway, then shows how a notification callback
//! is verified and acknowledged.
//!
//! # Usage
//!
//! ```bash
//! export SOOPAY_MERCHANT_ID=60000100
//! export SOOPAY_PFX=/path/to/merchant.p12
//! export SOOPAY_PFX_PASSWORD=secret
//! export SOOPAY_GATEWAY_CERT=/path/to/gateway.crt
//! cargo run --example order_query -- A001 20240101
//! ```

use soopay_lib::prelude::*;

fn env(name: &str) -> std::result::Result<String, Box<dyn std::error::Error>> {
    std::env::var(name).map_err(|_| format!("{} is not set", name).into())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let order_id = args.next().unwrap_or_else(|| "A001".to_string());
    let mer_date = args.next().unwrap_or_else(|| "20240101".to_string());

    let client = Client::builder(ClientConfig::from_env()?)
        .private_key(load_private_key_from_pfx_file(
            env("SOOPAY_PFX")?,
            &env("SOOPAY_PFX_PASSWORD")?,
        )?)
        .public_key(load_public_key_from_file(env("SOOPAY_GATEWAY_CERT")?)?)
        .logger(|log| {
            for (k, v) in log.to_map() {
                println!("  [log] {} = {}", k, v);
            }
        })
        .build()?;

    println!("Querying order {} ({}) as merchant {}", order_id, mer_date, client.merchant_id());

    let mut data = Params::new();
    data.set("order_id", order_id.as_str())
        .set("mer_date", mer_date.as_str());

    match client
        .execute(&CancellationToken::new(), "mer_order_info_query", &mut data)
        .await
    {
        Ok(result) if result.is_ret_ok() => {
            println!("Order state: {}", result.get("trade_state").unwrap_or("?"));
        }
        Ok(result) => {
            println!(
                "Gateway refused: {} {}",
                result.get("ret_code").unwrap_or_default(),
                result.get("ret_msg").unwrap_or_default()
            );
        }
        Err(SoopayError::SignatureInvalid) => {
            println!("Response signature did not verify; ignoring response");
        }
        Err(e) => return Err(e.into()),
    }

    // A notification arrives as the query string of the callback URL.
    // Verify it, then answer with a signed page.
    let callback_query = "order_id=A001&mer_date=20240101&trade_state=TRADE_SUCCESS&sign=bm90LXNpZ25lZA%3D%3D";
    match client.verify_query_string(callback_query) {
        Ok(notice) => {
            let mut ack = Params::new();
            ack.set("order_id", notice.get("order_id").unwrap_or_default())
                .set("mer_date", notice.get("mer_date").unwrap_or_default())
                .set("ret_code", RET_CODE_OK);
            println!("{}", client.reply_html(&mut ack)?);
        }
        Err(e) => println!("Notification rejected: {}", e),
    }

    Ok(())
}
