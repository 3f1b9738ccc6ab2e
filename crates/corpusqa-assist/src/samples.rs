//! Built-in corpora used when no page text can be fetched.

/// Used at startup when the configured source is unreachable.
pub const SAMPLE_CORPUS: &str = "\
VodafoneZiggo Internet Services

Home and business internet with high-speed connectivity, in packages sized to each household.

Fiber Optic Internet: download speeds up to 1000 Mbps over our fiber network.
Cable Internet: dependable, fast internet over a nationwide cable infrastructure.
5G Mobile: mobile data on the latest 5G network.

Customer Support: reachable 24/7 by phone, chat and email.
Installation: a technician can install your connection in most areas.
Router: a premium router comes with every service plan.
";

/// Richer corpus for initialization and smoke tests.
pub const EXTENDED_SAMPLE_CORPUS: &str = "\
VodafoneZiggo Internet Services Overview

1. Fiber Optic Internet
- Download speeds up to 1000 Mbps (1 Gbps)
- Upload speeds up to 100 Mbps
- Latency below 10 ms
- Available in urban and suburban areas

2. Cable Internet
- Download speeds up to 500 Mbps
- Upload speeds up to 50 Mbps
- Unlimited data
- Available nationwide

3. Mobile 5G
- Coverage in major cities and along highways
- Speeds up to 1 Gbps
- Data plans from 10 GB to unlimited
- Works with every 5G phone

4. Residential Packages and Prices
- Starter: 100 Mbps for 35 euro per month
- Pro: 500 Mbps for 55 euro per month
- Elite: 1000 Mbps for 75 euro per month

Customer Support
- Phone number: +31 20 000 0000, open 24/7
- Email: support@ziggo.nl
- Chat on the website
- Average response time under 2 hours

Installation and Setup
- Professional installation is available
- One-time cost of 50 euro, waived on annual plans
- A router is included with the service
- Setup takes 2 to 4 hours, including home network configuration

Billing and Payments
- Monthly billing
- Annual plans get 10% off
- Several payment methods accepted
- Cancellation requires 30 days notice
";
